//! Subscription traps: unchanged recurring charges running for months
//!
//! Debits are grouped by merchant, description prefix and rounded amount.
//! A group is a trap when it has repeated at an unchanged price for at least
//! three months and is still being charged.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use super::{format_time, round_to, sort_by_time, DetectionContext, Detector};
use crate::models::{Leak, NormalizedTransaction, Severity};

const MIN_OCCURRENCES: usize = 3;
/// Allowed relative deviation from the first charge
const AMOUNT_TOLERANCE: f64 = 0.01;
const MIN_MONTHS: f64 = 3.0;
const DAYS_PER_MONTH: f64 = 30.0;
const MIN_MONTHLY_COST: f64 = 10.0;
const HIGH_MONTHLY_COST: f64 = 50.0;
const DESCRIPTION_PREFIX_CHARS: usize = 50;
const ID_KEY_CHARS: usize = 20;

/// Grouping key for charges that look like the same recurring debit
fn recurrence_key(tx: &NormalizedTransaction) -> String {
    let description: String = tx
        .description
        .trim()
        .chars()
        .take(DESCRIPTION_PREFIX_CHARS)
        .collect();
    format!("{}_{}_{:.2}", tx.merchant.trim(), description, tx.abs_amount)
}

pub struct SubscriptionTrapDetector;

impl Detector for SubscriptionTrapDetector {
    fn name(&self) -> &'static str {
        "SubscriptionTraps"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        // Undated rows cannot contribute to a time span
        let mut groups: BTreeMap<String, Vec<&NormalizedTransaction>> = BTreeMap::new();
        for tx in ctx.transactions {
            if tx.is_debit() && tx.timestamp.is_some() {
                groups.entry(recurrence_key(tx)).or_default().push(tx);
            }
        }

        let mut leaks = Vec::new();
        for (key, mut group) in groups {
            if group.len() < MIN_OCCURRENCES {
                continue;
            }
            sort_by_time(&mut group);

            if let Some(leak) = self.evaluate_group(ctx, &key, &group) {
                leaks.push(leak);
            }
        }

        leaks
    }
}

impl SubscriptionTrapDetector {
    fn evaluate_group(
        &self,
        ctx: &DetectionContext<'_>,
        key: &str,
        group: &[&NormalizedTransaction],
    ) -> Option<Leak> {
        let first = group.first()?;
        let last = group.last()?;
        let (first_seen, last_seen) = (first.timestamp?, last.timestamp?);

        let first_amount = first.abs_amount;
        let consistent = group.iter().all(|tx| {
            (tx.abs_amount - first_amount).abs() / first_amount.max(0.01) < AMOUNT_TOLERANCE
        });
        if !consistent {
            return None;
        }

        let months_span = (last_seen - first_seen).num_days() as f64 / DAYS_PER_MONTH;
        if months_span < MIN_MONTHS {
            return None;
        }

        let per_month = group.len() as f64 / months_span.max(0.1);
        let monthly_cost = first_amount * per_month;
        if monthly_cost < MIN_MONTHLY_COST {
            return None;
        }

        let days_since_last = (ctx.now - last_seen).num_days();
        if days_since_last > ctx.config.subscription_recency_days {
            debug!(key, days_since_last, "Recurring charge no longer active");
            return None;
        }

        let severity = if monthly_cost >= HIGH_MONTHLY_COST {
            Severity::High
        } else {
            Severity::Medium
        };

        let merchant_name = [&first.merchant, &first.description]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        let id_key: String = key.chars().take(ID_KEY_CHARS).collect();

        Some(
            Leak::new(
                format!("subscription-trap-{}", id_key),
                self.name(),
                severity,
                format!("Recurring charge: {}", merchant_name),
                format!(
                    "You've been paying R{:.2} to {} every month for {:.1} months. \
                     That's about R{:.0} per month. Check if you still need this.",
                    first_amount, merchant_name, months_span, monthly_cost
                ),
            )
            .with_transaction(Some(last.id.clone()))
            .with_cost(monthly_cost)
            .with_evidence(json!({
                "merchant": merchant_name,
                "amount": first_amount,
                "frequency_per_month": round_to(per_month, 2),
                "months_active": round_to(months_span, 1),
                "total_occurrences": group.len(),
                "first_occurrence": format_time(Some(first_seen)),
                "last_occurrence": format_time(Some(last_seen)),
            })),
        )
    }
}
