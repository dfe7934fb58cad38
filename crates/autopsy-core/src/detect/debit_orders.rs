//! Debit order review: large single debit orders and many small ones

use serde_json::json;

use super::{
    contains_any, format_time, latest_id, sum_abs, top_merchants, top_merchants_evidence,
    DetectionContext, Detector,
};
use crate::models::{Leak, NormalizedTransaction, Severity};

const DEBIT_ORDER_KEYWORDS: &[&str] = &[
    "debit order",
    "debitorder",
    "debit",
    "stop order",
    "recurring",
    "deduction",
    "auto debit",
];

/// Single debit orders at or above this are reviewed individually
const HIGH_VALUE: f64 = 500.0;
const FREQUENT_COUNT: usize = 5;
const FREQUENT_MIN_TOTAL: f64 = 200.0;
const FREQUENT_HIGH_TOTAL: f64 = 500.0;

pub struct DebitOrderDetector;

impl Detector for DebitOrderDetector {
    fn name(&self) -> &'static str {
        "DebitOrders"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let recent: Vec<&NormalizedTransaction> = ctx
            .debits()
            .filter(|tx| ctx.is_recent(tx))
            .filter(|tx| contains_any(&tx.merchant_text(), DEBIT_ORDER_KEYWORDS))
            .collect();
        if recent.is_empty() {
            return vec![];
        }

        let mut leaks: Vec<Leak> = recent
            .iter()
            .filter(|tx| tx.abs_amount >= HIGH_VALUE)
            .map(|tx| self.high_value_leak(tx))
            .collect();

        let monthly_cost = sum_abs(&recent);
        let count = recent.len();
        if count >= FREQUENT_COUNT && monthly_cost >= FREQUENT_MIN_TOTAL {
            let severity = if monthly_cost >= FREQUENT_HIGH_TOTAL {
                Severity::High
            } else {
                Severity::Medium
            };
            let ranked = top_merchants(&recent);
            let top_name = ranked
                .first()
                .map(|(name, _)| name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or("Various");

            leaks.push(
                Leak::new(
                    "debit-order-frequent",
                    self.name(),
                    severity,
                    "Multiple debit orders detected",
                    format!(
                        "You have {} debit orders in the last 30 days totaling R{:.0}. \
                         Top merchant: {}. Review these to ensure they're all legitimate.",
                        count, monthly_cost, top_name
                    ),
                )
                .with_transaction(latest_id(&recent))
                .with_cost(monthly_cost)
                .with_evidence(json!({
                    "count_last_30_days": count,
                    "sum_last_30_days": monthly_cost,
                    "top_merchants": top_merchants_evidence(&ranked, 5),
                })),
            );
        }

        leaks
    }
}

impl DebitOrderDetector {
    fn high_value_leak(&self, tx: &NormalizedTransaction) -> Leak {
        Leak::new(
            format!("debit-order-high-{}", tx.id),
            self.name(),
            Severity::High,
            format!("High-value debit order: R{:.0}", tx.abs_amount),
            format!(
                "A debit order of R{:.0} was processed. Make sure this is expected and authorized.",
                tx.abs_amount
            ),
        )
        .with_transaction(Some(tx.id.clone()))
        .with_cost(tx.abs_amount)
        .with_evidence(json!({
            "amount": tx.abs_amount,
            "merchant": tx.merchant,
            "description": tx.description,
            "date": format_time(tx.timestamp),
        }))
    }
}
