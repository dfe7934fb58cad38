//! Detector listing and configuration inspection

use std::path::Path;

use anyhow::Result;
use autopsy_core::config::default_config_path;
use autopsy_core::{EngineConfig, ForensicEngine};

use super::load_config;

/// Where the effective configuration comes from
pub fn config_source(explicit: Option<&Path>) -> String {
    if let Some(path) = explicit {
        return path.display().to_string();
    }
    match default_config_path().filter(|p| p.exists()) {
        Some(path) => path.display().to_string(),
        None => "built-in defaults".to_string(),
    }
}

pub fn cmd_detectors(config: Option<&Path>) -> Result<()> {
    let engine = ForensicEngine::with_config(load_config(config)?);

    println!("🔎 Registered detectors (run order)");
    println!("   ─────────────────────────────");
    for (i, name) in engine.detector_names().iter().enumerate() {
        let status = if engine.is_enabled(name) {
            "enabled"
        } else {
            "disabled"
        };
        println!("   {}. {:<20} {}", i + 1, name, status);
    }

    Ok(())
}

pub fn cmd_config(config: Option<&Path>, path_only: bool) -> Result<()> {
    if path_only {
        match default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("(no data directory available)"),
        }
        return Ok(());
    }

    let resolved = load_config(config)?;
    print!("{}", render_config(&resolved, &config_source(config)));
    Ok(())
}

pub fn render_config(config: &EngineConfig, source: &str) -> String {
    let s = &config.scoring;
    let disabled = if config.disabled_detectors.is_empty() {
        "none".to_string()
    } else {
        config.disabled_detectors.join(", ")
    };

    let lines = [
        format!("⚙️  Engine configuration ({})", source),
        "   Windows:".to_string(),
        format!("     recent activity:        {} days", config.recent_days),
        format!(
            "     subscription recency:   {} days",
            config.subscription_recency_days
        ),
        format!("     mailbox withdrawals:    {} hours", config.mailbox_hours),
        "   Scoring:".to_string(),
        format!(
            "     penalties (low/med/high): {}/{}/{}",
            s.penalty_low, s.penalty_medium, s.penalty_high
        ),
        format!(
            "     cost penalty:           cost/{} capped at {}",
            s.cost_divisor, s.cost_cap
        ),
        format!(
            "     low confidence:         -{} below {} rows",
            s.low_confidence_penalty, s.low_confidence_rows
        ),
        format!(
            "   Bands: green >= {}, yellow >= {}",
            s.green_threshold, s.yellow_threshold
        ),
        format!("   Disabled detectors: {}", disabled),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
