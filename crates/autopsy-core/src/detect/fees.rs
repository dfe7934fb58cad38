//! Fee leakage: service, transfer and cash-out fees

use serde_json::json;

use super::{contains_any, latest_id, sample, sum_abs, DetectionContext, Detector};
use crate::models::{Leak, NormalizedTransaction, Severity};

const FEE_KEYWORDS: &[&str] = &[
    "service fee",
    "charge",
    "fee",
    "cash-out",
    "cash out",
    "withdrawal fee",
    "transfer fee",
];

const MIN_MONTHLY_COST: f64 = 40.0;
const MIN_COUNT: usize = 3;
const HIGH_MONTHLY_COST: f64 = 150.0;

/// Whether a row's text looks like a bank or wallet fee
pub fn is_fee(tx: &NormalizedTransaction) -> bool {
    contains_any(&tx.merchant_text(), FEE_KEYWORDS)
}

pub struct FeeLeakageDetector;

impl Detector for FeeLeakageDetector {
    fn name(&self) -> &'static str {
        "FeeLeakage"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let fees: Vec<&NormalizedTransaction> = ctx.debits().filter(|tx| is_fee(tx)).collect();
        if fees.is_empty() {
            return vec![];
        }

        let recent: Vec<&NormalizedTransaction> =
            fees.iter().copied().filter(|tx| ctx.is_recent(tx)).collect();
        let basis = if recent.is_empty() { &fees } else { &recent };
        let monthly_cost = sum_abs(basis);
        let count = basis.len();

        if monthly_cost < MIN_MONTHLY_COST && count < MIN_COUNT {
            return vec![];
        }

        let severity = if monthly_cost >= HIGH_MONTHLY_COST {
            Severity::High
        } else {
            Severity::Medium
        };

        vec![Leak::new(
            "fee-leakage",
            self.name(),
            severity,
            "Fees are eating your balance",
            format!(
                "You paid about R{:.0} in fees recently (service fees / cash-out fees). \
                 That's money leaving without helping your household.",
                monthly_cost
            ),
        )
        .with_transaction(latest_id(&recent))
        .with_cost(monthly_cost)
        .with_evidence(json!({
            "count_last_30_days": count,
            "sum_last_30_days": monthly_cost,
            "sample": sample(&fees, 8),
        }))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::detect::test_support::*;

    fn run(rows: &[NormalizedTransaction]) -> Vec<Leak> {
        let config = EngineConfig::default();
        FeeLeakageDetector.detect(&DetectionContext::new(rows, now(), &config))
    }

    #[test]
    fn test_three_small_fees_flagged() {
        let rows = vec![
            debit("f1", 5.0, "Monthly service fee", days_ago(3)),
            debit("f2", 7.5, "Cash-out", days_ago(2)),
            debit("f3", 2.0, "Transfer fee", days_ago(1)),
            debit("g1", 300.0, "Groceries", days_ago(1)),
        ];

        let leaks = run(&rows);
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].severity, Severity::Medium);
        assert_eq!(leaks[0].estimated_monthly_cost, Some(14.5));
        assert_eq!(leaks[0].transaction_id.as_deref(), Some("f3"));
        assert_eq!(leaks[0].evidence["count_last_30_days"], 3);
    }

    #[test]
    fn test_expensive_fees_are_high() {
        let rows = vec![
            debit("f1", 90.0, "ATM withdrawal fee", days_ago(3)),
            debit("f2", 80.0, "Bank charge", days_ago(2)),
        ];
        assert_eq!(run(&rows)[0].severity, Severity::High);
    }

    #[test]
    fn test_single_small_fee_ignored() {
        let rows = vec![debit("f1", 5.0, "service fee", days_ago(3))];
        assert!(run(&rows).is_empty());
    }
}
