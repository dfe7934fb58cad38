//! Inclusion score and stakeholder metrics
//!
//! The inclusion score is an alternate credit-worthiness proxy built from
//! transaction consistency. It is compared against a simulated traditional
//! score to produce the inclusion delta; retail velocity is the monthly
//! value that closing every leak would free up.

use crate::detect::{contains_any, round_to, DetectionContext, TELECOM_KEYWORDS};
use crate::models::{InclusionLevel, InclusionScore, Leak, Severity, StakeholderMetrics};

const BASE_SCORE: i32 = 50;
const CONSISTENT_MNO_BONUS: i32 = 15;
const SPARSE_MNO_BONUS: i32 = 5;
/// Recent telecom rows needed for consistent MNO activity
const CONSISTENT_MNO_ROWS: usize = 3;
const HIGH_LEAK_PENALTY: i32 = 10;
const HISTORY_BONUS: i32 = 10;
const HISTORY_ROWS: usize = 20;

const HIGH_LEVEL: u8 = 75;
const MEDIUM_LEVEL: u8 = 40;

/// Traditional scoring discount for thin or informal credit files
const TRADITIONAL_DISCOUNT: i32 = 15;
/// Additional traditional discount when credits pass straight through
const MAILBOX_DISCOUNT: i32 = 25;
const MAILBOX_DETECTOR: &str = "MailboxEffect";

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn inclusion_score(ctx: &DetectionContext<'_>, leaks: &[Leak]) -> InclusionScore {
    let mno_rows = ctx
        .transactions
        .iter()
        .filter(|tx| ctx.is_recent(tx))
        .filter(|tx| contains_any(&tx.merchant_text(), TELECOM_KEYWORDS))
        .count();

    let mut score = BASE_SCORE;
    if mno_rows >= CONSISTENT_MNO_ROWS {
        score += CONSISTENT_MNO_BONUS;
    } else if mno_rows > 0 {
        score += SPARSE_MNO_BONUS;
    }

    let high_leaks = leaks.iter().filter(|l| l.severity == Severity::High).count() as i32;
    score -= HIGH_LEAK_PENALTY * high_leaks;

    if ctx.transactions.len() > HISTORY_ROWS {
        score += HISTORY_BONUS;
    }

    let score = score.clamp(0, 100) as u8;
    let level = if score >= HIGH_LEVEL {
        InclusionLevel::High
    } else if score >= MEDIUM_LEVEL {
        InclusionLevel::Medium
    } else {
        InclusionLevel::Low
    };

    InclusionScore {
        score,
        level,
        mno_consistency: mno_rows >= CONSISTENT_MNO_ROWS,
    }
}

/// Inclusion score minus a simulated traditional credit score
pub fn inclusion_delta(inclusion: u8, leaks: &[Leak]) -> i32 {
    let inclusion = i32::from(inclusion);
    let mut traditional = inclusion - TRADITIONAL_DISCOUNT;
    if leaks.iter().any(|l| l.detector == MAILBOX_DETECTOR) {
        traditional -= MAILBOX_DISCOUNT;
    }
    inclusion - traditional.max(0)
}

/// Sum of every leak's monthly cost (missing costs count as zero)
pub fn retail_velocity(leaks: &[Leak]) -> f64 {
    leaks.iter().map(Leak::monthly_cost).sum()
}

pub fn stakeholder_metrics(inclusion: &InclusionScore, leaks: &[Leak]) -> StakeholderMetrics {
    let velocity = retail_velocity(leaks);
    StakeholderMetrics {
        inclusion_delta: inclusion_delta(inclusion.score, leaks),
        retail_velocity: round_to(velocity, 2),
        potential_recovered_capital: round_to(velocity * MONTHS_PER_YEAR, 2),
    }
}
