//! Autopsy Core Library
//!
//! Forensic rules engine for personal transaction histories:
//! - Normalization of loosely-typed transaction records
//! - Money leak detectors (airtime, fees, informal loans, subscriptions, ...)
//! - Health scoring, banding and plain-language summaries
//! - Inclusion score and stakeholder metrics
//! - Mobile-money inclusion tax, spending profiles and outlier transactions
//! - JSON and CSV input parsing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use autopsy_core::{import, ForensicEngine};
//!
//! let records = import::parse_payload(&payload)?;
//! let report = ForensicEngine::new().analyze(&records);
//! println!("{} ({})", report.financial_health_score, report.health_band);
//! ```

pub mod anomaly;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod import;
pub mod inclusion;
pub mod models;
pub mod momo;
pub mod normalize;
pub mod profile;
pub mod score;

pub use anomaly::Anomaly;
pub use config::{EngineConfig, ScoringConfig};
pub use detect::{DetectionContext, Detector};
pub use engine::ForensicEngine;
pub use error::{Error, Result};
pub use models::{
    AnalysisReport, Direction, Evidence, HealthBand, InclusionLevel, InclusionScore, Leak,
    NormalizedTransaction, RawTransaction, Severity, StakeholderMetrics,
};
pub use momo::{InclusionTax, MomoPattern, MomoPatternKind};
pub use normalize::normalize;
pub use profile::{ProfileKind, SpendingProfile, SpendingTrend};
