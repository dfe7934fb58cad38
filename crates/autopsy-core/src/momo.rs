//! Mobile-money (MoMo) analysis: the inclusion tax and MoMo usage patterns

use serde::{Deserialize, Serialize};

use crate::detect::{contains_any, round_to};
use crate::models::{NormalizedTransaction, Severity};

const CASH_OUT_KEYWORDS: &[&str] = &["cash-out", "cash out", "withdrawal"];
const MOMO_MARKER: &str = "momo";

const SMALL_CASHOUT_COUNT: usize = 5;
const SMALL_CASHOUT_AVERAGE: f64 = 100.0;
/// Inclusion tax percentage above which the fee burden is flagged
const HIGH_INCLUSION_TAX: f64 = 5.0;

/// Share of mobile-money volume lost to cash-out fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InclusionTax {
    pub inclusion_tax_percentage: f64,
    pub total_momo_volume: f64,
    pub cash_out_fees: f64,
    pub cash_out_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomoPatternKind {
    FrequentSmallCashouts,
    HighInclusionTax,
}

impl MomoPatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrequentSmallCashouts => "frequent_small_cashouts",
            Self::HighInclusionTax => "high_inclusion_tax",
        }
    }
}

/// A notable mobile-money usage pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomoPattern {
    #[serde(rename = "type")]
    pub kind: MomoPatternKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

fn is_momo(tx: &NormalizedTransaction) -> bool {
    tx.description.contains(MOMO_MARKER) || tx.channel == MOMO_MARKER
}

fn is_cash_out_fee(tx: &NormalizedTransaction) -> bool {
    contains_any(&tx.description, CASH_OUT_KEYWORDS)
        && (tx.description.contains("fee") || tx.is_debit())
}

/// Cash-out fee volume as a percentage of total MoMo volume
pub fn inclusion_tax(table: &[NormalizedTransaction]) -> InclusionTax {
    let mut total_volume = 0.0;
    let mut fees = 0.0;
    let mut count = 0;

    for tx in table {
        if is_momo(tx) {
            total_volume += tx.abs_amount;
        }
        if is_cash_out_fee(tx) {
            fees += tx.abs_amount;
            count += 1;
        }
    }

    let percentage = if total_volume > 0.0 {
        fees / total_volume * 100.0
    } else {
        0.0
    };

    InclusionTax {
        inclusion_tax_percentage: round_to(percentage, 2),
        total_momo_volume: round_to(total_volume, 2),
        cash_out_fees: round_to(fees, 2),
        cash_out_count: count,
    }
}

pub fn momo_patterns(table: &[NormalizedTransaction]) -> Vec<MomoPattern> {
    let mut patterns = Vec::new();

    let cash_outs: Vec<f64> = table
        .iter()
        .filter(|tx| tx.description.contains("cash-out"))
        .map(|tx| tx.abs_amount)
        .collect();
    if cash_outs.len() >= SMALL_CASHOUT_COUNT {
        let average = cash_outs.iter().sum::<f64>() / cash_outs.len() as f64;
        if average < SMALL_CASHOUT_AVERAGE {
            patterns.push(MomoPattern {
                kind: MomoPatternKind::FrequentSmallCashouts,
                severity: Severity::Medium,
                count: Some(cash_outs.len()),
                average_amount: Some(round_to(average, 2)),
                percentage: None,
            });
        }
    }

    let tax = inclusion_tax(table);
    if tax.inclusion_tax_percentage > HIGH_INCLUSION_TAX {
        patterns.push(MomoPattern {
            kind: MomoPatternKind::HighInclusionTax,
            severity: Severity::High,
            count: None,
            average_amount: None,
            percentage: Some(tax.inclusion_tax_percentage),
        });
    }

    patterns
}
