//! Mailbox effect: large credits that are withdrawn almost immediately
//!
//! Money that only passes through an account leaks to cash-out fees and
//! informal costs and leaves the household no buffer.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{format_time, round_to, sort_by_time, DetectionContext, Detector};
use crate::models::{Leak, NormalizedTransaction, Severity};

/// Credits below this are not "large"
const MIN_CREDIT: f64 = 500.0;
/// Share of the credit that must leave within the window
const MIN_WITHDRAWAL_RATIO: f64 = 0.8;
/// Fee and informal-cost leakage assumed on pass-through money
const PASS_THROUGH_COST_RATE: f64 = 0.05;

pub struct MailboxEffectDetector;

impl Detector for MailboxEffectDetector {
    fn name(&self) -> &'static str {
        "MailboxEffect"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let mut credits: Vec<&NormalizedTransaction> = ctx
            .transactions
            .iter()
            .filter(|tx| tx.is_credit() && tx.abs_amount >= MIN_CREDIT && tx.timestamp.is_some())
            .collect();
        sort_by_time(&mut credits);

        let window = ctx.config.mailbox_window();
        for credit in credits {
            let Some(credited_at) = credit.timestamp else {
                continue;
            };
            let window_end = credited_at
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);

            let withdrawals: Vec<&NormalizedTransaction> = ctx
                .transactions
                .iter()
                .filter(|tx| tx.is_debit())
                .filter(|tx| {
                    tx.timestamp
                        .is_some_and(|ts| ts > credited_at && ts <= window_end)
                })
                .collect();
            let withdrawn: f64 = withdrawals.iter().map(|tx| tx.abs_amount).sum();
            let ratio = withdrawn / credit.abs_amount;

            if ratio < MIN_WITHDRAWAL_RATIO {
                continue;
            }

            let cost = withdrawn * PASS_THROUGH_COST_RATE;
            return vec![Leak::new(
                "mailbox-effect",
                self.name(),
                Severity::High,
                "Money leaves as soon as it arrives",
                format!(
                    "R{:.0} came in and {:.0}% of it (R{:.0}) left within {} hours. \
                     Money that only passes through your account loses about R{:.0} to fees and informal costs.",
                    credit.abs_amount,
                    ratio * 100.0,
                    withdrawn,
                    ctx.config.mailbox_hours,
                    cost
                ),
            )
            .with_transaction(Some(credit.id.clone()))
            .with_cost(cost)
            .with_evidence(json!({
                "credit_amount": credit.abs_amount,
                "credit_timestamp": format_time(credit.timestamp),
                "withdrawn_amount": withdrawn,
                "withdrawal_ratio": round_to(ratio, 4),
                "withdrawal_count": withdrawals.len(),
                "window_hours": ctx.config.mailbox_hours,
            }))];
        }

        vec![]
    }
}
