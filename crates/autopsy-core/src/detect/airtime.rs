//! Airtime drains: many small telecom purchases that add up

use serde_json::json;

use super::{contains_any, latest_id, sample, sum_abs, DetectionContext, Detector, TELECOM_KEYWORDS};
use crate::models::{Leak, NormalizedTransaction, Severity};

/// Top-ups above this are not "small"
const MAX_TOP_UP: f64 = 50.0;
const MIN_COUNT: usize = 5;
const MIN_MONTHLY_COST: f64 = 150.0;
const HIGH_MONTHLY_COST: f64 = 300.0;
const HIGH_COUNT: usize = 12;

pub struct AirtimeDrainDetector;

impl Detector for AirtimeDrainDetector {
    fn name(&self) -> &'static str {
        "AirtimeDrains"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let candidates: Vec<&NormalizedTransaction> = ctx
            .debits()
            .filter(|tx| tx.abs_amount <= MAX_TOP_UP)
            .filter(|tx| contains_any(&tx.merchant_text(), TELECOM_KEYWORDS))
            .collect();
        if candidates.is_empty() {
            return vec![];
        }

        let recent: Vec<&NormalizedTransaction> = candidates
            .iter()
            .copied()
            .filter(|tx| ctx.is_recent(tx))
            .collect();
        let count = recent.len();
        // With nothing dated in the window, the whole history stands in for a month
        let monthly_cost = if recent.is_empty() {
            sum_abs(&candidates)
        } else {
            sum_abs(&recent)
        };

        if count < MIN_COUNT && monthly_cost < MIN_MONTHLY_COST {
            return vec![];
        }

        let severity = if monthly_cost >= HIGH_MONTHLY_COST || count >= HIGH_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };

        vec![Leak::new(
            "airtime-drain",
            self.name(),
            severity,
            "Airtime is quietly draining your money",
            format!(
                "You made {} small airtime/data buys recently. \
                 Small top-ups add up, estimated about R{:.0} per month.",
                count, monthly_cost
            ),
        )
        .with_transaction(latest_id(&recent))
        .with_cost(monthly_cost)
        .with_evidence(json!({
            "count_last_30_days": count,
            "sum_last_30_days": monthly_cost,
            "sample": sample(&candidates, 5),
        }))]
    }
}
