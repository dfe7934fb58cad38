//! Transaction normalization
//!
//! Turns loosely-typed input records into the canonical table every detector
//! reads. Normalization never fails and never drops a row: malformed values
//! fall back to safe defaults and detectors decide what is relevant.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{Direction, NormalizedTransaction, RawTransaction};

/// Naive datetime layouts accepted in addition to RFC 3339 (interpreted as UTC)
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Epoch values above this are taken to be milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Normalize a batch of raw records into the canonical table
pub fn normalize(records: &[RawTransaction]) -> Vec<NormalizedTransaction> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut tx = normalize_one(index, raw);
            tx.id = unique_id(tx.id, index, &mut seen);
            tx
        })
        .collect()
}

/// Suffix repeated ids with the row index until they are unique in the batch
fn unique_id(id: String, index: usize, seen: &mut HashSet<String>) -> String {
    let mut candidate = id;
    while seen.contains(&candidate) {
        tracing::debug!(id = %candidate, index, "Duplicate transaction id");
        candidate = format!("{}-{}", candidate, index);
    }
    seen.insert(candidate.clone());
    candidate
}

fn normalize_one(index: usize, raw: &RawTransaction) -> NormalizedTransaction {
    let amount = coerce_amount(raw.amount.as_ref());
    let timestamp = raw.timestamp.as_ref().and_then(parse_timestamp);
    let description = lower_text(raw.description.as_ref());

    NormalizedTransaction {
        id: resolve_id(index, raw, amount, &description),
        timestamp,
        amount,
        abs_amount: amount.abs(),
        description,
        merchant: lower_text(raw.merchant.as_ref()),
        category: lower_text(raw.category.as_ref()),
        counterparty: lower_text(raw.counterparty.as_ref()),
        channel: lower_text(raw.channel.as_ref()),
        direction: resolve_direction(raw.direction.as_ref(), amount),
    }
}

/// Render any JSON scalar as text; null and absent become ""
fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn lower_text(value: Option<&Value>) -> String {
    value_text(value).to_lowercase()
}

/// Coerce an amount to a finite number, defaulting to 0.0
fn coerce_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse a timestamp value; unparseable input yields `None`
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let epoch = n.as_f64()?;
            if !epoch.is_finite() {
                return None;
            }
            if epoch.abs() > EPOCH_MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(epoch as i64)
            } else {
                DateTime::from_timestamp(epoch as i64, 0)
            }
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Use the stated direction, inferring from the sign only when it is missing
fn resolve_direction(value: Option<&Value>, amount: f64) -> Direction {
    let stated = lower_text(value);
    match stated.trim() {
        "debit" => Direction::Debit,
        "credit" => Direction::Credit,
        "" | "none" | "nan" | "null" => {
            if amount < 0.0 {
                Direction::Debit
            } else if amount > 0.0 {
                Direction::Credit
            } else {
                Direction::Unknown
            }
        }
        _ => Direction::Unknown,
    }
}

/// Keep the source id, or synthesize a stable one from the row's contents
fn resolve_id(index: usize, raw: &RawTransaction, amount: f64, description: &str) -> String {
    let source = value_text(raw.id.as_ref());
    if !source.trim().is_empty() {
        return source;
    }

    let mut hasher = Sha256::new();
    hasher.update((index as u64).to_be_bytes());
    hasher.update(value_text(raw.timestamp.as_ref()).as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(description.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("tx-{}", &digest[..12])
}
