//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::Path;

use autopsy_core::EngineConfig;

use crate::commands::{self, OutputFormat};

const NOW: &str = "2026-10-18T12:00:00Z";

fn airtime_json() -> String {
    let rows: Vec<String> = (1..=6)
        .map(|d| {
            format!(
                r#"{{"id": "a{}", "timestamp": "2026-10-{:02}T09:00:00Z", "amount": -20, "description": "Vodacom Airtime"}}"#,
                d,
                18 - d
            )
        })
        .collect();
    format!("[{}]", rows.join(","))
}

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Empty config file so results never depend on a local override
fn default_config(dir: &Path) -> std::path::PathBuf {
    write_file(dir, "defaults.toml", "")
}

// ========== Option Parsing Tests ==========

#[test]
fn test_output_format_parse() {
    assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert!("yaml".parse::<OutputFormat>().is_err());
}

#[test]
fn test_parse_now() {
    let now = commands::parse_now(Some("2026-10-18T14:00:00+02:00")).unwrap();
    assert_eq!(now.to_rfc3339(), "2026-10-18T12:00:00+00:00");
    assert!(commands::parse_now(Some("last tuesday")).is_err());
    assert!(commands::parse_now(None).is_ok());
}

#[test]
fn test_format_rand() {
    assert_eq!(commands::format_rand(42.5), "R42.50");
}

// ========== Analyze Command Tests ==========

#[test]
fn test_run_analysis_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "tx.json", &airtime_json());

    let config = default_config(dir.path());
    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();
    assert_eq!(report.leaks.len(), 1);
    assert_eq!(report.leaks[0].detector, "AirtimeDrains");
    assert_eq!(report.financial_health_score, 66);
}

#[test]
fn test_run_analysis_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "tx.csv",
        "timestamp,amount,description\n2026-10-17,-20,Vodacom Airtime\n2026-10-16,-20,Vodacom Airtime\n",
    );

    let config = default_config(dir.path());
    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();
    assert!(report.leaks.is_empty());
    assert!(!report.inclusion_score.mno_consistency);
}

#[test]
fn test_run_analysis_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "tx.json", &airtime_json());
    let config = write_file(
        dir.path(),
        "engine.toml",
        "[detectors]\ndisabled = [\"AirtimeDrains\"]\n",
    );

    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();
    assert!(report.leaks.is_empty());
}

#[test]
fn test_cmd_analyze_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "tx.json", &airtime_json());

    let config = Some(default_config(dir.path()));
    let config = config.as_deref();

    assert!(commands::cmd_analyze(&path, Some(NOW), "text", config).is_ok());
    assert!(commands::cmd_analyze(&path, Some(NOW), "json", config).is_ok());
    assert!(commands::cmd_analyze(&path, Some(NOW), "xml", config).is_err());
}

#[test]
fn test_cmd_analyze_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = Some(default_config(dir.path()));
    let config = config.as_deref();

    let missing = dir.path().join("missing.json");
    assert!(commands::cmd_analyze(&missing, Some(NOW), "text", config).is_err());

    let bad = write_file(dir.path(), "bad.json", r#"{"rows": []}"#);
    assert!(commands::cmd_analyze(&bad, Some(NOW), "text", config).is_err());

    let good = write_file(dir.path(), "tx.json", "[]");
    assert!(commands::cmd_analyze(&good, Some("not a time"), "text", config).is_err());
}

#[test]
fn test_render_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "tx.json", &airtime_json());
    let config = default_config(dir.path());
    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();

    let text = commands::render_report(&report);
    assert!(text.contains("Financial health: 66/100 (yellow)"));
    assert!(text.contains("Money leaks (1)"));
    assert!(text.contains("[medium]"));
    assert!(text.contains("~R120.00/month"));
    assert!(text.contains("Inclusion delta:   +15"));
    assert!(text.contains("Spending profile: moderate_spender"));
    assert!(!text.contains("Mobile money"));
    assert!(!text.contains("Unusual transactions"));
}

#[test]
fn test_render_report_lists_outliers() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows: Vec<String> = (2..=12)
        .map(|d| {
            format!(
                r#"{{"id": "g{}", "timestamp": "2026-09-{:02}T12:00:00Z", "amount": -100, "description": "Groceries"}}"#,
                d, d
            )
        })
        .collect();
    rows[0] = r#"{"id": "big", "timestamp": "2026-09-02T12:00:00Z", "amount": -5000, "description": "Furniture"}"#.to_string();
    let path = write_file(dir.path(), "tx.json", &format!("[{}]", rows.join(",")));

    let config = default_config(dir.path());
    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();
    let text = commands::render_report(&report);
    assert!(text.contains("Unusual transactions (1)"));
    assert!(text.contains("big R5000.00 (unusual amount)"));
}

#[test]
fn test_render_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "tx.json", r#"{"transactions": []}"#);
    let config = default_config(dir.path());
    let report = commands::run_analysis(&path, Some(NOW), Some(&config)).unwrap();

    let text = commands::render_report(&report);
    assert!(text.contains("Financial health: 90/100 (green)"));
    assert!(text.contains("No money leaks detected"));
}

// ========== Config Command Tests ==========

#[test]
fn test_cmd_detectors() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    assert!(commands::cmd_detectors(Some(&config)).is_ok());
}

#[test]
fn test_cmd_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    assert!(commands::cmd_config(Some(&config), true).is_ok());
    assert!(commands::cmd_config(Some(&config), false).is_ok());

    let bad = write_file(dir.path(), "engine.toml", "[windows]\nrecent_days = 0\n");
    assert!(commands::cmd_config(Some(&bad), false).is_err());
}

#[test]
fn test_render_config() {
    let config = EngineConfig {
        disabled_detectors: vec!["WeekendSpending".to_string()],
        ..EngineConfig::default()
    };

    let text = commands::render_config(&config, "test");
    assert!(text.contains("Engine configuration (test)"));
    assert!(text.contains("recent activity:        30 days"));
    assert!(text.contains("penalties (low/med/high): 8/18/30"));
    assert!(text.contains("Disabled detectors: WeekendSpending"));
}

#[test]
fn test_config_source_prefers_explicit_path() {
    assert_eq!(
        commands::config_source(Some(Path::new("/tmp/engine.toml"))),
        "/tmp/engine.toml"
    );
}
