//! Informal loan ratios: heavy person-to-person transfer volume
//!
//! A large share of spending going out as wallet or P2P transfers is a sign
//! of informal borrowing pressure. The whole P2P volume is reported as the
//! monthly cost; the implied interest is a flat estimate over that volume,
//! not a measured rate, and only feeds the thresholds and evidence.

use serde_json::json;

use super::{contains_any, latest_id, sample, sum_abs, DetectionContext, Detector};
use crate::models::{Leak, NormalizedTransaction, Severity};

const P2P_KEYWORDS: &[&str] = &[
    "p2p",
    "send money",
    "momo",
    "wallet",
    "pay to",
    "payto",
    "e-wallet",
    "ewallet",
];

const LOAN_KEYWORDS: &[&str] = &[
    "loan",
    "borrow",
    "repay",
    "repayment",
    "stokvel",
    "sassa",
    "mashonisa",
];

/// Flat informal-lending interest assumed on P2P volume
pub const IMPLIED_INTEREST_RATE: f64 = 0.15;

const MIN_RATIO: f64 = 0.25;
const MIN_LOAN_MATCHES: usize = 2;
const MIN_INTEREST: f64 = 50.0;
const HIGH_RATIO: f64 = 0.45;
const HIGH_INTEREST: f64 = 200.0;

pub struct InformalLoanDetector;

impl Detector for InformalLoanDetector {
    fn name(&self) -> &'static str {
        "InformalLoanRatios"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let recent: Vec<&NormalizedTransaction> =
            ctx.debits().filter(|tx| ctx.is_recent(tx)).collect();
        if recent.is_empty() {
            return vec![];
        }

        let p2p: Vec<&NormalizedTransaction> = recent
            .iter()
            .copied()
            .filter(|tx| contains_any(&tx.transfer_text(), P2P_KEYWORDS))
            .collect();
        if p2p.is_empty() {
            return vec![];
        }

        let total_spend = sum_abs(&recent);
        let p2p_spend = sum_abs(&p2p);
        let ratio = p2p_spend / total_spend.max(1.0);
        let loan_like = p2p
            .iter()
            .filter(|tx| contains_any(&tx.transfer_text(), LOAN_KEYWORDS))
            .count();
        let implied_interest = p2p_spend * IMPLIED_INTEREST_RATE;

        if ratio < MIN_RATIO && loan_like < MIN_LOAN_MATCHES && implied_interest < MIN_INTEREST {
            return vec![];
        }

        let severity = if ratio >= HIGH_RATIO || implied_interest >= HIGH_INTEREST {
            Severity::High
        } else {
            Severity::Medium
        };

        vec![Leak::new(
            "informal-loan-ratio",
            self.name(),
            severity,
            "Too much money is going to informal loans",
            format!(
                "About {:.0}% of your spending in the last 30 days looks like person-to-person transfers. \
                 This can be a sign of informal borrowing pressure, costing roughly R{:.0} a month in interest.",
                ratio * 100.0,
                implied_interest
            ),
        )
        .with_transaction(latest_id(&p2p))
        .with_cost(p2p_spend)
        .with_evidence(json!({
            "p2p_spend_last_30_days": p2p_spend,
            "total_spend_last_30_days": total_spend,
            "ratio": ratio,
            "tagged_loan_like_count": loan_like,
            "implied_interest_rate": IMPLIED_INTEREST_RATE,
            "estimated_interest": implied_interest,
            "sample": sample(&p2p, 6),
        }))]
    }
}
