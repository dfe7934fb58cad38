//! Spending profile and spending trend
//!
//! A heuristic profile of the whole table: how large transactions are, how
//! often they happen, and how much happens on weekends. With enough history
//! the month-over-month volume trend is added as a forward-looking signal.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::detect::round_to;
use crate::models::NormalizedTransaction;

const MIN_PROFILE_ROWS: usize = 5;
const MIN_TREND_ROWS: usize = 10;
const MIN_TREND_MONTHS: usize = 3;
/// Monthly volume growth above which spending counts as increasing
const INCREASING_TREND: f64 = 50.0;
const TREND_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    FrequentSmallSpender,
    HighValueSpender,
    InfrequentSpender,
    ModerateSpender,
}

impl ProfileKind {
    pub fn cluster_id(&self) -> u8 {
        match self {
            Self::FrequentSmallSpender => 0,
            Self::HighValueSpender => 1,
            Self::InfrequentSpender => 2,
            Self::ModerateSpender => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrequentSmallSpender => "frequent_small_spender",
            Self::HighValueSpender => "high_value_spender",
            Self::InfrequentSpender => "infrequent_spender",
            Self::ModerateSpender => "moderate_spender",
        }
    }

    fn classify(avg_amount: f64, per_day: f64) -> Self {
        if avg_amount < 50.0 && per_day > 5.0 {
            Self::FrequentSmallSpender
        } else if avg_amount > 500.0 {
            Self::HighValueSpender
        } else if per_day < 1.0 {
            Self::InfrequentSpender
        } else {
            Self::ModerateSpender
        }
    }
}

/// Forward-looking signal derived from monthly volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrend {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub confidence: f64,
    /// Average change in monthly volume between the first and last month
    pub monthly_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingProfile {
    pub profile: ProfileKind,
    pub cluster_id: u8,
    pub avg_transaction_amount: f64,
    pub transactions_per_day: f64,
    /// Share of dated rows that fall on a weekend
    pub weekend_ratio: f64,
    pub trend: Option<SpendingTrend>,
}

/// Profile the table; `None` without enough rows or without any timestamp
pub fn spending_profile(table: &[NormalizedTransaction]) -> Option<SpendingProfile> {
    if table.len() < MIN_PROFILE_ROWS {
        return None;
    }

    let first = table.iter().filter_map(|tx| tx.timestamp).min()?;
    let last = table.iter().filter_map(|tx| tx.timestamp).max()?;

    let avg_amount = table.iter().map(|tx| tx.abs_amount).sum::<f64>() / table.len() as f64;
    let span_days = (last - first).num_days().max(1);
    let per_day = table.len() as f64 / span_days as f64;

    let (weekend, dated) = table
        .iter()
        .filter_map(|tx| tx.is_weekend())
        .fold((0usize, 0usize), |(weekend, dated), is_weekend| {
            (weekend + usize::from(is_weekend), dated + 1)
        });
    let weekend_ratio = weekend as f64 / dated.max(1) as f64;

    let profile = ProfileKind::classify(avg_amount, per_day);
    Some(SpendingProfile {
        profile,
        cluster_id: profile.cluster_id(),
        avg_transaction_amount: round_to(avg_amount, 2),
        transactions_per_day: round_to(per_day, 2),
        weekend_ratio: round_to(weekend_ratio, 2),
        trend: spending_trend(table),
    })
}

/// Increasing-spending signal from per-calendar-month absolute volume
pub fn spending_trend(table: &[NormalizedTransaction]) -> Option<SpendingTrend> {
    if table.len() < MIN_TREND_ROWS {
        return None;
    }

    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for tx in table {
        if let Some(ts) = tx.timestamp {
            *monthly.entry((ts.year(), ts.month())).or_default() += tx.abs_amount;
        }
    }
    if monthly.len() < MIN_TREND_MONTHS {
        return None;
    }

    let first = *monthly.values().next()?;
    let last = *monthly.values().next_back()?;
    let change = (last - first) / monthly.len() as f64;
    if change <= INCREASING_TREND {
        return None;
    }

    Some(SpendingTrend {
        kind: "increasing_spending".to_string(),
        description: "Your spending is trending upward".to_string(),
        confidence: TREND_CONFIDENCE,
        monthly_change: round_to(change, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::*;

    fn daily(n: i64, amount: f64) -> Vec<NormalizedTransaction> {
        (0..n)
            .map(|i| debit(&format!("t{}", i), amount, "shop", days_ago(i)))
            .collect()
    }

    #[test]
    fn test_needs_rows_and_time() {
        assert!(spending_profile(&daily(4, 10.0)).is_none());

        let undated: Vec<_> = (0..6)
            .map(|i| debit(&format!("u{}", i), 10.0, "shop", None))
            .collect();
        assert!(spending_profile(&undated).is_none());
    }

    #[test]
    fn test_frequent_small_spender() {
        // 12 rows over a two-day span
        let rows: Vec<_> = (0..12)
            .map(|i| debit(&format!("t{}", i), 20.0, "taxi", days_ago(i % 3)))
            .collect();

        let profile = spending_profile(&rows).unwrap();
        assert_eq!(profile.profile, ProfileKind::FrequentSmallSpender);
        assert_eq!(profile.cluster_id, 0);
        assert_eq!(profile.avg_transaction_amount, 20.0);
        assert_eq!(profile.transactions_per_day, 6.0);
    }

    #[test]
    fn test_high_value_and_infrequent() {
        let big = spending_profile(&daily(5, 800.0)).unwrap();
        assert_eq!(big.profile, ProfileKind::HighValueSpender);

        let sparse: Vec<_> = (0..5)
            .map(|i| debit(&format!("t{}", i), 100.0, "shop", days_ago(i * 10)))
            .collect();
        let profile = spending_profile(&sparse).unwrap();
        assert_eq!(profile.profile, ProfileKind::InfrequentSpender);
        assert_eq!(profile.cluster_id, 2);
    }

    #[test]
    fn test_moderate_spender_and_weekend_ratio() {
        // now() is a Sunday: 0 and 1 days ago are Sunday and Saturday
        let rows = daily(7, 100.0);
        let profile = spending_profile(&rows).unwrap();
        assert_eq!(profile.profile, ProfileKind::ModerateSpender);
        assert_eq!(profile.weekend_ratio, 0.29);
        assert!(profile.trend.is_none());
    }

    #[test]
    fn test_increasing_trend() {
        // 2026-07, 2026-08, 2026-09, 2026-10 with growing volume
        let mut rows = Vec::new();
        for (days, amount) in [(100, 50.0), (70, 100.0), (40, 150.0), (10, 300.0)] {
            for i in 0..3 {
                rows.push(debit(&format!("m{}-{}", days, i), amount, "shop", days_ago(days + i)));
            }
        }

        let trend = spending_trend(&rows).unwrap();
        assert_eq!(trend.kind, "increasing_spending");
        assert_eq!(trend.confidence, 0.7);
        // (900 - 150) / 4
        assert_eq!(trend.monthly_change, 187.5);
        assert!(spending_profile(&rows).unwrap().trend.is_some());
    }

    #[test]
    fn test_flat_trend_is_none() {
        let rows: Vec<_> = (0..12)
            .map(|i| debit(&format!("t{}", i), 100.0, "shop", days_ago(i * 10)))
            .collect();
        assert!(spending_trend(&rows).is_none());
        assert!(spending_trend(&rows[..9]).is_none());
    }
}
