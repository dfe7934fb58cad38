//! Value-added service charges: premium SMS, content and in-app charges

use serde_json::json;

use super::{
    contains_any, latest_id, sample, sum_abs, top_merchants, top_merchants_evidence,
    DetectionContext, Detector,
};
use crate::models::{Leak, NormalizedTransaction, Severity};

const VAS_KEYWORDS: &[&str] = &[
    "vas",
    "value added",
    "premium sms",
    "sms service",
    "subscription",
    "opt-in",
    "opt in",
    "service charge",
    "content charge",
    "ringtone",
    "wallpaper",
    "game",
    "app purchase",
    "in-app",
];

const MIN_MONTHLY_COST: f64 = 20.0;
const MIN_COUNT: usize = 3;
const HIGH_MONTHLY_COST: f64 = 100.0;
const HIGH_COUNT: usize = 10;

pub struct VasChargeDetector;

impl Detector for VasChargeDetector {
    fn name(&self) -> &'static str {
        "VASCharges"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let recent: Vec<&NormalizedTransaction> = ctx
            .debits()
            .filter(|tx| ctx.is_recent(tx))
            .filter(|tx| contains_any(&tx.merchant_text(), VAS_KEYWORDS))
            .collect();
        if recent.is_empty() {
            return vec![];
        }

        let monthly_cost = sum_abs(&recent);
        let count = recent.len();
        if monthly_cost < MIN_MONTHLY_COST && count < MIN_COUNT {
            return vec![];
        }

        let severity = if monthly_cost >= HIGH_MONTHLY_COST || count >= HIGH_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };

        let ranked = top_merchants(&recent);
        let top_name = ranked
            .first()
            .map(|(name, _)| name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Various services");

        vec![Leak::new(
            "vas-charges",
            self.name(),
            severity,
            "Value-added service charges are adding up",
            format!(
                "You've paid R{:.0} in value-added service charges in the last 30 days ({} charges). \
                 These are often subscriptions, premium SMS, or app purchases you might have forgotten about. \
                 Top charge: {}.",
                monthly_cost, count, top_name
            ),
        )
        .with_transaction(latest_id(&recent))
        .with_cost(monthly_cost)
        .with_evidence(json!({
            "count_last_30_days": count,
            "sum_last_30_days": monthly_cost,
            "top_merchants": top_merchants_evidence(&ranked, 5),
            "sample": sample(&recent, 5),
        }))]
    }
}
