//! Engine configuration
//!
//! Holds the analysis windows, scoring penalties and band thresholds. The
//! defaults reproduce the engine's reference constants exactly.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path passed by the caller
//! 2. Override in data dir (~/.local/share/autopsy/config/engine.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Longest window accepted for any lookback (a century)
const MAX_WINDOW_DAYS: i64 = 36_500;

/// Scoring penalties and band thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub penalty_low: f64,
    pub penalty_medium: f64,
    pub penalty_high: f64,
    /// Monthly cost is divided by this before being subtracted
    pub cost_divisor: f64,
    /// Upper bound on the cost part of a single leak's penalty
    pub cost_cap: f64,
    /// Tables with fewer rows than this get the low-confidence penalty
    pub low_confidence_rows: usize,
    pub low_confidence_penalty: f64,
    pub green_threshold: u8,
    pub yellow_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty_low: 8.0,
            penalty_medium: 18.0,
            penalty_high: 30.0,
            cost_divisor: 20.0,
            cost_cap: 25.0,
            low_confidence_rows: 8,
            low_confidence_penalty: 10.0,
            green_threshold: 75,
            yellow_threshold: 50,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Trailing window for "recent" activity
    pub recent_days: i64,
    /// Last charge of a recurring group must fall within this many days
    pub subscription_recency_days: i64,
    /// Withdrawal window after a large credit
    pub mailbox_hours: i64,
    pub scoring: ScoringConfig,
    /// Detector names that should not run
    pub disabled_detectors: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recent_days: 30,
            subscription_recency_days: 60,
            mailbox_hours: 48,
            scoring: ScoringConfig::default(),
            disabled_detectors: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Resolve config: explicit path, then the data-dir override, then defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    pub fn recent_window(&self) -> Duration {
        Duration::days(self.recent_days)
    }

    pub fn mailbox_window(&self) -> Duration {
        Duration::hours(self.mailbox_hours)
    }

    pub fn is_disabled(&self, detector: &str) -> bool {
        self.disabled_detectors
            .iter()
            .any(|d| d.eq_ignore_ascii_case(detector))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("autopsy").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    windows: Option<RawWindows>,
    scoring: Option<RawScoring>,
    bands: Option<RawBands>,
    detectors: Option<RawDetectors>,
}

#[derive(Debug, Deserialize)]
struct RawWindows {
    recent_days: Option<i64>,
    subscription_recency_days: Option<i64>,
    mailbox_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawScoring {
    penalty_low: Option<f64>,
    penalty_medium: Option<f64>,
    penalty_high: Option<f64>,
    cost_divisor: Option<f64>,
    cost_cap: Option<f64>,
    low_confidence_rows: Option<usize>,
    low_confidence_penalty: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBands {
    green: Option<u8>,
    yellow: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct RawDetectors {
    disabled: Option<Vec<String>>,
}

/// Parse config from TOML content, layering it over the defaults
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(windows) = raw.windows {
        if let Some(days) = windows.recent_days {
            config.recent_days = days;
        }
        if let Some(days) = windows.subscription_recency_days {
            config.subscription_recency_days = days;
        }
        if let Some(hours) = windows.mailbox_hours {
            config.mailbox_hours = hours;
        }
    }

    if let Some(scoring) = raw.scoring {
        let s = &mut config.scoring;
        if let Some(v) = scoring.penalty_low {
            s.penalty_low = v;
        }
        if let Some(v) = scoring.penalty_medium {
            s.penalty_medium = v;
        }
        if let Some(v) = scoring.penalty_high {
            s.penalty_high = v;
        }
        if let Some(v) = scoring.cost_divisor {
            s.cost_divisor = v;
        }
        if let Some(v) = scoring.cost_cap {
            s.cost_cap = v;
        }
        if let Some(v) = scoring.low_confidence_rows {
            s.low_confidence_rows = v;
        }
        if let Some(v) = scoring.low_confidence_penalty {
            s.low_confidence_penalty = v;
        }
    }

    if let Some(bands) = raw.bands {
        if let Some(green) = bands.green {
            config.scoring.green_threshold = green;
        }
        if let Some(yellow) = bands.yellow {
            config.scoring.yellow_threshold = yellow;
        }
    }

    if let Some(detectors) = raw.detectors {
        if let Some(disabled) = detectors.disabled {
            config.disabled_detectors = disabled;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<()> {
    if config.recent_days <= 0 || config.subscription_recency_days <= 0 {
        return Err(Error::Config("window lengths must be positive".into()));
    }
    if config.mailbox_hours <= 0 {
        return Err(Error::Config("mailbox_hours must be positive".into()));
    }
    if config.recent_days > MAX_WINDOW_DAYS
        || config.subscription_recency_days > MAX_WINDOW_DAYS
        || config.mailbox_hours > MAX_WINDOW_DAYS * 24
    {
        return Err(Error::Config(format!(
            "window lengths cannot exceed {} days",
            MAX_WINDOW_DAYS
        )));
    }
    if config.scoring.cost_divisor <= 0.0 {
        return Err(Error::Config("cost_divisor must be positive".into()));
    }
    if config.scoring.yellow_threshold > config.scoring.green_threshold {
        return Err(Error::Config(
            "yellow band threshold cannot exceed green".into(),
        ));
    }
    Ok(())
}
