//! Input parsing for transaction payloads
//!
//! Accepts JSON (a bare list of transaction objects, or an object wrapping
//! that list under `transactions`) and header-row CSV. Field values are
//! passed through untyped; coercion is the normalizer's job.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawTransaction;

/// Parse a JSON payload into raw transaction records
pub fn parse_payload(content: &str) -> Result<Vec<RawTransaction>> {
    let value: Value = serde_json::from_str(content)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("transactions") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(Error::InvalidData(
                    "`transactions` must be a list".to_string(),
                ))
            }
            None => {
                return Err(Error::InvalidData(
                    "expected a list of transactions or an object with `transactions`".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::InvalidData(
                "expected a list of transactions".to_string(),
            ))
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(_) => Ok(serde_json::from_value(item)?),
            other => Err(Error::InvalidData(format!(
                "transaction {} is not an object: {}",
                index, other
            ))),
        })
        .collect::<Result<Vec<RawTransaction>>>()?;

    debug!("Parsed {} transactions from JSON", records.len());
    Ok(records)
}

/// Parse header-row CSV into raw transaction records
///
/// Headers are matched case-insensitively; `date` is accepted for
/// `timestamp` and unknown columns are ignored. Empty cells count as absent.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut raw = RawTransaction::default();

        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = Some(Value::String(cell.to_string()));
            match header.as_str() {
                "id" => raw.id = value,
                "timestamp" | "date" => raw.timestamp = value,
                "amount" => raw.amount = value,
                "description" => raw.description = value,
                "merchant" => raw.merchant = value,
                "category" => raw.category = value,
                "counterparty" => raw.counterparty = value,
                "direction" => raw.direction = value,
                "channel" => raw.channel = value,
                _ => {}
            }
        }

        records.push(raw);
    }

    debug!("Parsed {} transactions from CSV", records.len());
    Ok(records)
}

/// Load a transaction file, choosing the parser by extension (`.csv` or JSON)
pub fn load_file(path: &Path) -> Result<Vec<RawTransaction>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_csv(File::open(path)?)
    } else {
        parse_payload(&std::fs::read_to_string(path)?)
    }
}
