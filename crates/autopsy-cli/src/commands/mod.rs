//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Run the engine over a transaction file and render the report
//! - `config` - Detector listing and configuration inspection

pub mod analyze;
pub mod config;

use std::path::Path;

use anyhow::{Context, Result};
use autopsy_core::EngineConfig;

// Re-export command functions for main.rs
pub use analyze::*;
pub use config::*;

/// Resolve the engine config from an explicit path, the override file, or defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

/// Format a Rand amount with two decimals
pub fn format_rand(amount: f64) -> String {
    format!("R{:.2}", amount)
}
