//! Money leak detectors
//!
//! Each detector encodes one heuristic about wasteful or exploitative money
//! flows and turns the normalized table into zero or more [`Leak`]s:
//! - Airtime drains: many small telecom top-ups
//! - Fee leakage: service and cash-out fees
//! - Informal loan ratios: heavy person-to-person transfer volume
//! - Subscription traps: unchanged recurring charges over 3+ months
//! - VAS charges: premium SMS, content and in-app charges
//! - Debit orders: large or numerous debit orders
//! - Weekend spending: weekend daily spend far above weekdays
//! - Mailbox effect: large credits withdrawn almost immediately
//!
//! Detectors are pure functions of a [`DetectionContext`]. They never fail;
//! insufficient evidence is simply an empty result.

pub mod airtime;
pub mod debit_orders;
pub mod fees;
pub mod informal_loans;
pub mod mailbox;
pub mod subscription_traps;
pub mod vas_charges;
pub mod weekend_spending;

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::models::{Leak, NormalizedTransaction};

pub use airtime::AirtimeDrainDetector;
pub use debit_orders::DebitOrderDetector;
pub use fees::FeeLeakageDetector;
pub use informal_loans::InformalLoanDetector;
pub use mailbox::MailboxEffectDetector;
pub use subscription_traps::SubscriptionTrapDetector;
pub use vas_charges::VasChargeDetector;
pub use weekend_spending::WeekendSpendingDetector;

/// Keywords identifying mobile network operator activity
pub const TELECOM_KEYWORDS: &[&str] = &[
    "airtime", "data", "bundle", "vodacom", "mtn", "cell c", "telkom", "prepaid",
];

/// Everything a detector may look at during one analysis run
pub struct DetectionContext<'a> {
    /// Immutable snapshot shared by every detector
    pub transactions: &'a [NormalizedTransaction],
    /// Reference instant that trailing windows are measured from
    pub now: DateTime<Utc>,
    pub config: &'a EngineConfig,
}

impl<'a> DetectionContext<'a> {
    pub fn new(
        transactions: &'a [NormalizedTransaction],
        now: DateTime<Utc>,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            transactions,
            now,
            config,
        }
    }

    /// Start of the trailing "recent" window
    pub fn window_start(&self) -> DateTime<Utc> {
        self.now
            .checked_sub_signed(self.config.recent_window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether a row falls in the recent window (unknown times never do)
    pub fn is_recent(&self, tx: &NormalizedTransaction) -> bool {
        tx.timestamp.is_some_and(|ts| ts >= self.window_start())
    }

    /// Debit rows with a positive amount
    pub fn debits(&self) -> impl Iterator<Item = &'a NormalizedTransaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.is_debit() && tx.abs_amount > 0.0)
    }
}

/// A money leak heuristic
pub trait Detector: Send + Sync {
    /// Detector name reported on each leak (e.g. "AirtimeDrains")
    fn name(&self) -> &'static str;

    /// Analyze the table and produce leaks
    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Leak>;
}

/// The built-in detectors in report order
pub fn builtin_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(AirtimeDrainDetector),
        Box::new(FeeLeakageDetector),
        Box::new(InformalLoanDetector),
        Box::new(SubscriptionTrapDetector),
        Box::new(VasChargeDetector),
        Box::new(DebitOrderDetector),
        Box::new(WeekendSpendingDetector),
        Box::new(MailboxEffectDetector),
    ]
}

/// Case-insensitive substring match (text is already lower-cased)
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Stable sort by timestamp with unknown times last
pub fn sort_by_time<'t>(rows: &mut [&'t NormalizedTransaction]) {
    rows.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Id of the most recent row (later table position wins ties)
pub fn latest_id(rows: &[&NormalizedTransaction]) -> Option<String> {
    let mut sorted = rows.to_vec();
    sort_by_time(&mut sorted);
    sorted
        .iter()
        .rev()
        .find(|tx| tx.timestamp.is_some())
        .map(|tx| tx.id.clone())
}

pub fn sum_abs(rows: &[&NormalizedTransaction]) -> f64 {
    rows.iter().map(|tx| tx.abs_amount).sum()
}

pub fn format_time(ts: Option<DateTime<Utc>>) -> Value {
    match ts {
        Some(ts) => Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => Value::Null,
    }
}

/// The last `limit` rows in time order, as evidence samples
pub fn sample(rows: &[&NormalizedTransaction], limit: usize) -> Value {
    let mut sorted = rows.to_vec();
    sort_by_time(&mut sorted);
    let skip = sorted.len().saturating_sub(limit);
    Value::Array(
        sorted
            .iter()
            .skip(skip)
            .map(|tx| {
                json!({
                    "id": tx.id,
                    "timestamp": format_time(tx.timestamp),
                    "abs_amount": tx.abs_amount,
                    "description": tx.description,
                    "merchant": tx.merchant,
                    "counterparty": tx.counterparty,
                })
            })
            .collect(),
    )
}

/// Merchants ranked by summed amount, highest first (name breaks ties)
pub fn top_merchants(rows: &[&NormalizedTransaction]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in rows {
        *totals.entry(tx.merchant.as_str()).or_default() += tx.abs_amount;
    }

    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(merchant, total)| (merchant.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Top merchants as an evidence object
pub fn top_merchants_evidence(ranked: &[(String, f64)], limit: usize) -> Value {
    let map: serde_json::Map<String, Value> = ranked
        .iter()
        .take(limit)
        .map(|(merchant, total)| (merchant.clone(), json!(total)))
        .collect();
    Value::Object(map)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
