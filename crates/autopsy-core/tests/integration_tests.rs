//! Integration tests for autopsy-core
//!
//! These tests exercise the full parse → normalize → detect → report workflow
//! against a fixed reference instant.

use autopsy_core::{
    import::{parse_csv, parse_payload},
    EngineConfig, ForensicEngine, HealthBand, InclusionLevel, RawTransaction, Severity,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::io::Write;

/// Sunday 2026-10-18 12:00 UTC
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

fn tx(id: &str, amount: f64, description: &str, at: DateTime<Utc>) -> RawTransaction {
    serde_json::from_value(json!({
        "id": id,
        "timestamp": at.to_rfc3339(),
        "amount": amount,
        "description": description,
    }))
    .unwrap()
}

fn analyze(records: &[RawTransaction]) -> autopsy_core::AnalysisReport {
    ForensicEngine::new().analyze_at(records, now())
}

/// Six R20 "Vodacom Airtime" debits within the last 30 days
fn airtime_records() -> Vec<RawTransaction> {
    (0..6)
        .map(|i| tx(&format!("air{}", i), -20.0, "Vodacom Airtime", days_ago(i + 1)))
        .collect()
}

/// Ten neutral weekday debits; enough rows to avoid the low-confidence penalty
fn weekday_groceries() -> Vec<RawTransaction> {
    [2, 3, 4, 5, 6, 9, 10, 11, 12, 13]
        .into_iter()
        .map(|d| tx(&format!("g{}", d), -100.0, "Groceries", days_ago(d)))
        .collect()
}

// =============================================================================
// Report Properties
// =============================================================================

#[test]
fn test_empty_input() {
    let report = analyze(&[]);

    assert_eq!(report.financial_health_score, 90);
    assert_eq!(report.health_band, HealthBand::Green);
    assert!(report.leaks.is_empty());
    assert_eq!(
        report.summary,
        "No big money leaks found. Keep tracking your spending and check again after a few days."
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let mut records = airtime_records();
    records.extend(weekday_groceries());
    records.push(tx("salary", 5000.0, "Salary", days_ago(20)));
    // Missing id exercises synthesized ids
    records.push(serde_json::from_value(json!({"amount": "-35", "description": "Service fee"})).unwrap());

    let engine = ForensicEngine::new();
    let first = engine.analyze_at(&records, now());
    let second = engine.analyze_at(&records, now());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_score_stays_in_range() {
    let mut heavy = Vec::new();
    for i in 0..20 {
        heavy.push(tx(&format!("a{}", i), -45.0, "MTN airtime", days_ago(i % 25 + 1)));
        heavy.push(tx(&format!("f{}", i), -30.0, "Service fee", days_ago(i % 25 + 1)));
        heavy.push(tx(&format!("p{}", i), -400.0, "Send money loan repay", days_ago(i % 25 + 1)));
        heavy.push(tx(&format!("d{}", i), -900.0, "Debit order insurance", days_ago(i % 25 + 1)));
    }

    for records in [vec![], airtime_records(), heavy] {
        let report = analyze(&records);
        assert!(report.financial_health_score <= 100);
        let expected_band = match report.financial_health_score {
            75..=100 => HealthBand::Green,
            50..=74 => HealthBand::Yellow,
            _ => HealthBand::Red,
        };
        assert_eq!(report.health_band, expected_band);
        assert!(report.inclusion_score.score <= 100);
    }
}

#[test]
fn test_extra_qualifying_debit_never_raises_score() {
    let mut base = weekday_groceries();
    for d in [2, 3, 4, 5, 6] {
        base.push(tx(&format!("air{}", d), -20.0, "Vodacom Airtime", days_ago(d)));
    }
    let before = analyze(&base);
    assert_eq!(before.leaks.len(), 1);

    let mut more = base.clone();
    more.push(tx("air9", -20.0, "Vodacom Airtime", days_ago(9)));
    let after = analyze(&more);

    assert!(after.financial_health_score <= before.financial_health_score);
    // 100 - 18 - 100/20 vs 100 - 18 - 120/20
    assert_eq!(before.financial_health_score, 77);
    assert_eq!(after.financial_health_score, 76);
}

#[test]
fn test_malformed_rows_degrade() {
    let records = parse_payload(
        r#"[
            {"id": "x1", "amount": "abc", "timestamp": "yesterday", "direction": "sideways"},
            {"amount": null, "description": 42},
            {}
        ]"#,
    )
    .unwrap();

    let report = analyze(&records);
    assert!(report.leaks.is_empty());
    assert_eq!(report.financial_health_score, 90);
}

#[test]
fn test_extreme_timestamps_degrade() {
    let records: Vec<RawTransaction> = serde_json::from_value(json!([
        {"id": "far", "timestamp": 8210266876799000_i64, "amount": 1000},
        {"id": "out", "timestamp": 8210266876799000_i64, "amount": -900},
        {"id": "past", "timestamp": -8334601228800000_i64, "amount": -50},
    ]))
    .unwrap();

    let report = analyze(&records);
    assert!(report.leaks.is_empty());
    assert_eq!(report.financial_health_score, 90);
}

#[test]
fn test_duplicate_ids_keep_leaks_distinct() {
    let records = vec![
        tx("dup", -600.0, "Debit order insurance", days_ago(3)),
        tx("dup", -700.0, "Debit order gym", days_ago(4)),
    ];

    let report = analyze(&records);
    let ids: Vec<&str> = report.leaks.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["debit-order-high-dup", "debit-order-high-dup-1"]);
}

#[test]
fn test_outlier_purchase_reported() {
    let mut records = weekday_groceries();
    records.push(tx("big", -5000.0, "Furniture", days_ago(3)));

    let report = analyze(&records);
    assert!(report.leaks.is_empty());
    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].id, "big");
    assert_eq!(report.anomalies[0].unusual, vec!["amount".to_string()]);
}

#[test]
fn test_report_json_shape() {
    let report = analyze(&airtime_records());
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["financial_health_score"], 66);
    assert_eq!(value["health_band"], "yellow");
    assert_eq!(value["leaks"][0]["detector"], "AirtimeDrains");
    assert_eq!(value["leaks"][0]["severity"], "medium");
    assert_eq!(value["leaks"][0]["estimated_monthly_cost"], 120.0);
    assert!(value["leaks"][0]["evidence"].is_object());
    assert_eq!(value["inclusion_score"]["level"], "Medium");
    assert_eq!(value["inclusion_score"]["mno_consistency"], true);
    assert_eq!(value["stakeholder_metrics"]["retail_velocity"], 120.0);
    assert_eq!(value["stakeholder_metrics"]["potential_recovered_capital"], 1440.0);
    assert_eq!(value["spending_profile"]["profile"], "moderate_spender");
    assert!(value["momo_patterns"].as_array().unwrap().is_empty());
    assert!(value["anomalies"].as_array().unwrap().is_empty());
    assert_eq!(value["inclusion_tax"]["inclusion_tax_percentage"], 0.0);
}

// =============================================================================
// Detector Scenarios
// =============================================================================

#[test]
fn test_airtime_drain_scenario() {
    let report = analyze(&airtime_records());

    assert_eq!(report.leaks.len(), 1);
    let leak = &report.leaks[0];
    assert_eq!(leak.detector, "AirtimeDrains");
    assert_eq!(leak.severity, Severity::Medium);
    assert_eq!(leak.estimated_monthly_cost, Some(120.0));
    assert_eq!(leak.transaction_id.as_deref(), Some("air0"));
}

#[test]
fn test_mailbox_effect_scenario() {
    let t0 = days_ago(10);
    let records = vec![
        tx("salary", 1000.0, "Salary", t0),
        tx("rent", -600.0, "Rent", t0 + Duration::hours(10)),
        tx("shop", -250.0, "Groceries", t0 + Duration::hours(10)),
    ];

    let report = analyze(&records);
    assert_eq!(report.leaks.len(), 1);
    let leak = &report.leaks[0];
    assert_eq!(leak.detector, "MailboxEffect");
    assert_eq!(leak.severity, Severity::High);
    assert_eq!(leak.evidence["withdrawal_ratio"], 0.85);
    assert!((leak.estimated_monthly_cost.unwrap() - 42.5).abs() < 1e-9);

    // 100 - 30 - 42.5/20 - 10
    assert_eq!(report.financial_health_score, 58);
    assert_eq!(report.inclusion_score.score, 40);
    assert_eq!(report.inclusion_score.level, InclusionLevel::Medium);
    // Traditional score 40 - 15 - 25 floors at 0
    assert_eq!(report.stakeholder_metrics.inclusion_delta, 40);
}

#[test]
fn test_subscription_trap_scenario_from_csv() {
    let csv = "Date,Amount,Description,Merchant
2026-06-15,-99.00,Netflix,Netflix
2026-07-25,-99.00,Netflix,Netflix
2026-09-03,-99.00,Netflix,Netflix
2026-10-13,-99.00,Netflix,Netflix
";
    let records = parse_csv(csv.as_bytes()).unwrap();
    let report = analyze(&records);

    assert_eq!(report.leaks.len(), 1);
    let leak = &report.leaks[0];
    assert_eq!(leak.detector, "SubscriptionTraps");
    assert_eq!(leak.severity, Severity::High);
    assert_eq!(leak.evidence["months_active"], 4.0);
    assert_eq!(leak.evidence["frequency_per_month"], 1.0);
    assert!((leak.estimated_monthly_cost.unwrap() - 99.0).abs() < 1e-9);
    assert_eq!(report.health_band, HealthBand::Yellow);
}

#[test]
fn test_weekend_spending_scenario() {
    // 1 and 7 days ago are weekend days; the rest are weekdays
    let mut records = vec![
        tx("sat", -300.0, "Tavern", days_ago(1)),
        tx("sun", -300.0, "Tavern", days_ago(7)),
    ];
    for d in [2, 3, 4, 5, 6, 9, 10, 11, 12, 13] {
        records.push(tx(&format!("wd{}", d), -40.0, "Taxi", days_ago(d)));
    }

    let report = analyze(&records);
    assert_eq!(report.leaks.len(), 1);
    let leak = &report.leaks[0];
    assert_eq!(leak.detector, "WeekendSpending");
    assert_eq!(leak.severity, Severity::High);
    assert_eq!(leak.evidence["ratio"], 7.5);
    assert_eq!(report.health_band, HealthBand::Red);
}

#[test]
fn test_leaks_follow_detector_order() {
    let mut records = airtime_records();
    let t0 = days_ago(10);
    records.push(tx("grant", 2000.0, "Grant", t0));
    records.push(tx("out", -1900.0, "Cash", t0 + Duration::hours(2)));
    for i in 0..3 {
        records.push(tx(&format!("fee{}", i), -15.0, "Service fee", days_ago(i + 1)));
    }

    let report = analyze(&records);
    let detectors: Vec<&str> = report.leaks.iter().map(|l| l.detector.as_str()).collect();
    assert_eq!(detectors, vec!["AirtimeDrains", "FeeLeakage", "MailboxEffect"]);
    assert!(report.summary.contains("Money leaves as soon as it arrives"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_disables_detector() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[detectors]\ndisabled = [\"AirtimeDrains\"]").unwrap();

    let config = EngineConfig::load(Some(file.path())).unwrap();
    let report = ForensicEngine::with_config(config).analyze_at(&airtime_records(), now());
    assert!(report.leaks.is_empty());
}

#[test]
fn test_oversized_window_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[windows]\nrecent_days = 100000000").unwrap();

    assert!(EngineConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_wrapped_payload_matches_bare_list() {
    let bare: Value = serde_json::to_value(airtime_records()).unwrap();
    let wrapped = json!({ "transactions": bare.clone() });

    let from_bare = parse_payload(&bare.to_string()).unwrap();
    let from_wrapped = parse_payload(&wrapped.to_string()).unwrap();
    assert_eq!(analyze(&from_bare), analyze(&from_wrapped));
}
