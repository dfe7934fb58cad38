//! Domain models for the forensic engine

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::anomaly::Anomaly;
use crate::momo::{InclusionTax, MomoPattern};
use crate::profile::SpendingProfile;

/// Detector-specific supporting numbers and samples attached to a leak
pub type Evidence = serde_json::Map<String, Value>;

/// A transaction as supplied by an external collaborator
///
/// Every field is an optional JSON value so that wrongly-typed fields never
/// fail deserialization; the normalizer coerces them later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTransaction {
    pub id: Option<Value>,
    pub timestamp: Option<Value>,
    pub amount: Option<Value>,
    pub description: Option<Value>,
    pub merchant: Option<Value>,
    pub category: Option<Value>,
    pub counterparty: Option<Value>,
    pub direction: Option<Value>,
    pub channel: Option<Value>,
}

/// Money flow direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
    /// Neither stated nor inferable (e.g. a zero amount)
    Unknown,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical, engine-internal transaction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub id: String,
    /// `None` when the source timestamp could not be parsed
    pub timestamp: Option<DateTime<Utc>>,
    pub amount: f64,
    pub abs_amount: f64,
    pub description: String,
    pub merchant: String,
    pub category: String,
    pub counterparty: String,
    pub channel: String,
    pub direction: Direction,
}

impl NormalizedTransaction {
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    /// Text searched by merchant-style keyword detectors
    pub fn merchant_text(&self) -> String {
        format!("{} {} {}", self.description, self.merchant, self.category)
    }

    /// Text searched by person-to-person transfer detectors
    pub fn transfer_text(&self) -> String {
        format!("{} {} {}", self.description, self.counterparty, self.channel)
    }

    /// Saturday or Sunday (UTC); `None` when the time is unknown
    pub fn is_weekend(&self) -> Option<bool> {
        self.timestamp
            .map(|ts| matches!(ts.weekday(), Weekday::Sat | Weekday::Sun))
    }
}

/// How serious a leak is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Sort rank, most severe first
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A money leak found by a detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leak {
    /// Stable, detector-prefixed id (e.g. "airtime-drain")
    pub id: String,
    /// Name of the detector that produced this leak
    pub detector: String,
    pub title: String,
    pub plain_language_reason: String,
    pub severity: Severity,
    /// Most representative transaction, if any
    pub transaction_id: Option<String>,
    pub estimated_monthly_cost: Option<f64>,
    #[serde(default)]
    pub evidence: Evidence,
}

impl Leak {
    pub fn new(
        id: impl Into<String>,
        detector: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        plain_language_reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            detector: detector.into(),
            title: title.into(),
            plain_language_reason: plain_language_reason.into(),
            severity,
            transaction_id: None,
            estimated_monthly_cost: None,
            evidence: Evidence::new(),
        }
    }

    pub fn with_transaction(mut self, transaction_id: Option<String>) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    /// Attach a monthly cost estimate (negative estimates are clamped to zero)
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_monthly_cost = Some(cost.max(0.0));
        self
    }

    /// Attach evidence; non-object values are ignored
    pub fn with_evidence(mut self, evidence: Value) -> Self {
        if let Value::Object(map) = evidence {
            self.evidence = map;
        }
        self
    }

    /// Cost used by aggregate metrics (missing counts as zero)
    pub fn monthly_cost(&self) -> f64 {
        self.estimated_monthly_cost.unwrap_or(0.0)
    }
}

/// Coarse health classification derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Green,
    Yellow,
    Red,
}

impl HealthBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative level of the inclusion score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InclusionLevel {
    High,
    Medium,
    Low,
}

impl InclusionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Alternate credit-worthiness proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionScore {
    pub score: u8,
    pub level: InclusionLevel,
    /// Consistent mobile-network activity in the recent window
    pub mno_consistency: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeholderMetrics {
    /// Inclusion score minus the simulated traditional credit score
    pub inclusion_delta: i32,
    /// Monthly Rand value that closing every leak would free up
    pub retail_velocity: f64,
    /// Retail velocity over a year
    pub potential_recovered_capital: f64,
}

/// Final output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub financial_health_score: u8,
    pub health_band: HealthBand,
    /// In detector run order
    pub leaks: Vec<Leak>,
    pub summary: String,
    pub inclusion_score: InclusionScore,
    pub stakeholder_metrics: StakeholderMetrics,
    pub inclusion_tax: InclusionTax,
    pub momo_patterns: Vec<MomoPattern>,
    pub spending_profile: Option<SpendingProfile>,
    /// Outlier transactions, most unusual first
    pub anomalies: Vec<Anomaly>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn row(direction: Direction) -> NormalizedTransaction {
        NormalizedTransaction {
            id: "t1".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()),
            amount: -20.0,
            abs_amount: 20.0,
            description: "vodacom airtime".to_string(),
            merchant: "vodacom".to_string(),
            category: "telecom".to_string(),
            counterparty: String::new(),
            channel: "momo".to_string(),
            direction,
        }
    }

    #[test]
    fn test_raw_transaction_tolerates_bad_types() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "id": 7,
            "amount": "not a number",
            "timestamp": false,
            "extra": "ignored"
        }))
        .unwrap();
        assert_eq!(raw.id, Some(json!(7)));
        assert_eq!(raw.amount, Some(json!("not a number")));
        assert!(raw.description.is_none());
    }

    #[test]
    fn test_severity_rank_and_parse() {
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_leak_serialization_shape() {
        let leak = Leak::new("fee-leakage", "FeeLeakage", Severity::Medium, "Fees", "Reason")
            .with_cost(-5.0)
            .with_evidence(json!({"count_last_30_days": 3}));
        assert_eq!(leak.estimated_monthly_cost, Some(0.0));

        let value = serde_json::to_value(&leak).unwrap();
        assert_eq!(value["severity"], "medium");
        assert_eq!(value["transaction_id"], Value::Null);
        assert_eq!(value["evidence"]["count_last_30_days"], 3);
    }

    #[test]
    fn test_transaction_text_and_weekend() {
        let tx = row(Direction::Debit);
        assert!(tx.is_debit());
        assert!(!tx.is_credit());
        assert_eq!(tx.merchant_text(), "vodacom airtime vodacom telecom");
        assert_eq!(tx.transfer_text(), "vodacom airtime  momo");
        // 2026-10-17 is a Saturday
        assert_eq!(tx.is_weekend(), Some(true));
    }

    #[test]
    fn test_band_and_level_serialize() {
        assert_eq!(serde_json::to_value(HealthBand::Yellow).unwrap(), "yellow");
        assert_eq!(serde_json::to_value(InclusionLevel::High).unwrap(), "High");
        assert_eq!(serde_json::to_value(Direction::Unknown).unwrap(), "unknown");
    }
}
