//! Analyze command: run the engine over a transaction file and print the report

use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use autopsy_core::{import, AnalysisReport, ForensicEngine, HealthBand};
use chrono::{DateTime, Utc};

use super::{format_rand, load_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Unknown format: {} (expected text or json)", s)),
        }
    }
}

/// Parse the --now option, defaulting to the wall clock
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => {
            let parsed = DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("Invalid --now timestamp: {}", s))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

/// Load the file and analyze it at the given instant
pub fn run_analysis(
    file: &Path,
    now: Option<&str>,
    config: Option<&Path>,
) -> Result<AnalysisReport> {
    let config = load_config(config)?;
    let now = parse_now(now)?;
    let records = import::load_file(file)
        .with_context(|| format!("Failed to read transactions from {}", file.display()))?;
    tracing::debug!(records = records.len(), now = %now, "Loaded transactions");

    let engine = ForensicEngine::with_config(config);
    Ok(engine.analyze_at(&records, now))
}

pub fn cmd_analyze(
    file: &Path,
    now: Option<&str>,
    format: &str,
    config: Option<&Path>,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let report = run_analysis(file, now, config)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_report(&report)),
    }

    Ok(())
}

fn band_icon(band: HealthBand) -> &'static str {
    match band {
        HealthBand::Green => "🟢",
        HealthBand::Yellow => "🟡",
        HealthBand::Red => "🔴",
    }
}

/// Render the report as human-readable text
pub fn render_report(report: &AnalysisReport) -> String {
    let mut lines = vec![
        format!(
            "{} Financial health: {}/100 ({})",
            band_icon(report.health_band),
            report.financial_health_score,
            report.health_band
        ),
        format!("   {}", report.summary),
        String::new(),
    ];

    if report.leaks.is_empty() {
        lines.push("✅ No money leaks detected".to_string());
    } else {
        lines.push(format!("💸 Money leaks ({})", report.leaks.len()));
        lines.push("   ─────────────────────────────".to_string());
        for leak in &report.leaks {
            let cost = leak
                .estimated_monthly_cost
                .map(|c| format!("  ~{}/month", format_rand(c)))
                .unwrap_or_default();
            lines.push(format!("   [{}] {}{}", leak.severity, leak.title, cost));
            lines.push(format!("          {}", leak.plain_language_reason));
        }
    }
    lines.push(String::new());

    let inclusion = &report.inclusion_score;
    let metrics = &report.stakeholder_metrics;
    lines.push("📊 Stakeholder metrics".to_string());
    lines.push(format!(
        "   Inclusion score:   {} ({}, MNO consistency: {})",
        inclusion.score,
        inclusion.level.as_str(),
        if inclusion.mno_consistency { "yes" } else { "no" }
    ));
    lines.push(format!("   Inclusion delta:   {:+}", metrics.inclusion_delta));
    lines.push(format!(
        "   Retail velocity:   {}/month",
        format_rand(metrics.retail_velocity)
    ));
    lines.push(format!(
        "   Recoverable:       {}/year",
        format_rand(metrics.potential_recovered_capital)
    ));

    let tax = &report.inclusion_tax;
    if tax.total_momo_volume > 0.0 || !report.momo_patterns.is_empty() {
        lines.push(String::new());
        lines.push("📱 Mobile money".to_string());
        lines.push(format!(
            "   Inclusion tax: {:.2}% of {} ({} cash-out fees)",
            tax.inclusion_tax_percentage,
            format_rand(tax.total_momo_volume),
            tax.cash_out_count
        ));
        for pattern in &report.momo_patterns {
            lines.push(format!(
                "   Pattern: {} ({})",
                pattern.kind.as_str(),
                pattern.severity
            ));
        }
    }

    if let Some(profile) = &report.spending_profile {
        lines.push(String::new());
        lines.push(format!(
            "👤 Spending profile: {} ({:.2} tx/day, avg {}, {:.0}% weekend)",
            profile.profile.as_str(),
            profile.transactions_per_day,
            format_rand(profile.avg_transaction_amount),
            profile.weekend_ratio * 100.0
        ));
        if let Some(trend) = &profile.trend {
            lines.push(format!(
                "   📈 {} (+{}/month, confidence {:.1})",
                trend.description,
                format_rand(trend.monthly_change),
                trend.confidence
            ));
        }
    }

    if !report.anomalies.is_empty() {
        lines.push(String::new());
        lines.push(format!("⚠️  Unusual transactions ({})", report.anomalies.len()));
        for anomaly in &report.anomalies {
            lines.push(format!(
                "   {} {} (unusual {})",
                anomaly.id,
                format_rand(anomaly.amount),
                anomaly.unusual.join(", ")
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
