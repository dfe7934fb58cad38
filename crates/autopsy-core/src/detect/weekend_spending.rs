//! Weekend spending spikes
//!
//! Compares the average weekend debit against the average weekday debit
//! within the recent window. Each debit stands in for one spending day, so
//! several purchases on the same day count separately.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::json;

use super::{round_to, DetectionContext, Detector};
use crate::models::{Leak, NormalizedTransaction, Severity};

const MIN_TRANSACTIONS: usize = 10;
const MIN_RATIO: f64 = 1.5;
const HIGH_RATIO: f64 = 2.0;
const MIN_WEEKEND_SPEND: f64 = 200.0;
/// Weeks per month, used to project weekend spend onto a monthly figure
const WEEKS_PER_MONTH: f64 = 4.33;

#[derive(Default)]
struct DaySplit {
    total: f64,
    transactions: usize,
    days: BTreeSet<NaiveDate>,
}

impl DaySplit {
    fn add(&mut self, tx: &NormalizedTransaction) {
        self.total += tx.abs_amount;
        self.transactions += 1;
        if let Some(ts) = tx.timestamp {
            self.days.insert(ts.date_naive());
        }
    }

    fn average(&self) -> f64 {
        self.total / self.transactions.max(1) as f64
    }
}

pub struct WeekendSpendingDetector;

impl Detector for WeekendSpendingDetector {
    fn name(&self) -> &'static str {
        "WeekendSpending"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let recent: Vec<&NormalizedTransaction> = ctx
            .transactions
            .iter()
            .filter(|tx| tx.is_debit() && ctx.is_recent(tx))
            .collect();
        if recent.len() < MIN_TRANSACTIONS {
            return vec![];
        }

        let mut weekend = DaySplit::default();
        let mut weekday = DaySplit::default();
        for tx in &recent {
            match tx.is_weekend() {
                Some(true) => weekend.add(tx),
                Some(false) => weekday.add(tx),
                None => {}
            }
        }
        if weekend.transactions == 0 || weekday.transactions == 0 {
            return vec![];
        }

        let weekend_avg = weekend.average();
        let weekday_avg = weekday.average();
        if weekend_avg <= 0.0 || weekday_avg <= 0.0 {
            return vec![];
        }

        let ratio = weekend_avg / weekday_avg;
        if ratio < MIN_RATIO || weekend.total < MIN_WEEKEND_SPEND {
            return vec![];
        }

        let severity = if ratio >= HIGH_RATIO {
            Severity::High
        } else {
            Severity::Medium
        };

        vec![Leak::new(
            "weekend-spending-spike",
            self.name(),
            severity,
            "Weekend spending is much higher than weekdays",
            format!(
                "Your weekend spending (R{:.0}) is {:.1}x higher than weekday spending. \
                 This might be impulse purchases or social spending. Consider planning weekend expenses.",
                weekend.total, ratio
            ),
        )
        .with_cost(weekend.total * WEEKS_PER_MONTH)
        .with_evidence(json!({
            "weekend_spending": round_to(weekend.total, 2),
            "weekday_spending": round_to(weekday.total, 2),
            "weekend_avg_per_day": round_to(weekend_avg, 2),
            "weekday_avg_per_day": round_to(weekday_avg, 2),
            "ratio": round_to(ratio, 2),
            "weekend_days": weekend.days.len(),
            "weekday_days": weekday.days.len(),
            "weekend_transactions": weekend.transactions,
            "weekday_transactions": weekday.transactions,
        }))]
    }
}
