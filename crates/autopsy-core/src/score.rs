//! Health scoring, banding and the one-line summary

use crate::config::ScoringConfig;
use crate::models::{HealthBand, Leak, NormalizedTransaction, Severity};

pub const NO_LEAKS_SUMMARY: &str =
    "No big money leaks found. Keep tracking your spending and check again after a few days.";

fn severity_penalty(severity: Severity, cfg: &ScoringConfig) -> f64 {
    match severity {
        Severity::Low => cfg.penalty_low,
        Severity::Medium => cfg.penalty_medium,
        Severity::High => cfg.penalty_high,
    }
}

/// Combine leaks and table size into a 0-100 health score
///
/// Each leak costs its severity penalty plus a capped share of its monthly
/// cost. Small tables lose a flat low-confidence penalty. Half points round
/// to the nearest even integer.
pub fn score(table: &[NormalizedTransaction], leaks: &[Leak], cfg: &ScoringConfig) -> u8 {
    let mut score: f64 = 100.0;

    for leak in leaks {
        score -= severity_penalty(leak.severity, cfg);
        if let Some(cost) = leak.estimated_monthly_cost.filter(|c| *c > 0.0) {
            score -= (cost / cfg.cost_divisor).min(cfg.cost_cap);
        }
    }

    if table.len() < cfg.low_confidence_rows {
        score -= cfg.low_confidence_penalty;
    }

    score.round_ties_even().clamp(0.0, 100.0) as u8
}

pub fn band(score: u8, cfg: &ScoringConfig) -> HealthBand {
    if score >= cfg.green_threshold {
        HealthBand::Green
    } else if score >= cfg.yellow_threshold {
        HealthBand::Yellow
    } else {
        HealthBand::Red
    }
}

/// The most severe leak; ties go to the earliest in run order
pub fn top_leak(leaks: &[Leak]) -> Option<&Leak> {
    leaks.iter().reduce(|best, leak| {
        if leak.severity.rank() < best.severity.rank() {
            leak
        } else {
            best
        }
    })
}

pub fn summarize(_score: u8, band: HealthBand, leaks: &[Leak]) -> String {
    let Some(top) = top_leak(leaks) else {
        return NO_LEAKS_SUMMARY.to_string();
    };

    match band {
        HealthBand::Red => format!(
            "Warning: your money is leaking. Biggest issue: {}. Tap Freeze to simulate stopping it.",
            top.title
        ),
        HealthBand::Yellow => format!(
            "Your finances are under pressure. Biggest issue: {}. Small changes can help fast.",
            top.title
        ),
        HealthBand::Green => format!("Looking good overall. Still, watch out for: {}.", top.title),
    }
}
