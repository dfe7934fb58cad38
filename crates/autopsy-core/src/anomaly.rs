//! Outlier transactions
//!
//! Each row is described by its absolute amount, hour of day and day of
//! week. Features are standardized across the table and a row's score is its
//! largest absolute z-score. At most a tenth of the table is flagged, so a
//! noisy history cannot turn every row into an anomaly.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::detect::round_to;
use crate::models::NormalizedTransaction;

const MIN_ROWS: usize = 10;
/// A feature this many standard deviations from the mean is unusual
const Z_THRESHOLD: f64 = 2.0;
/// Largest share of the table that may be flagged
const CONTAMINATION: f64 = 0.1;
/// Stand-ins for rows without a timestamp (midday, Thursday)
const DEFAULT_HOUR: f64 = 12.0;
const DEFAULT_DAY_OF_WEEK: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Id of the flagged transaction
    pub id: String,
    /// Largest absolute z-score over the features
    pub score: f64,
    pub amount: f64,
    /// Features at or beyond the threshold ("amount", "hour", "day_of_week")
    pub unusual: Vec<String>,
}

struct Feature {
    name: &'static str,
    values: Vec<f64>,
}

impl Feature {
    /// Population z-scores; a constant feature scores zero everywhere
    fn z_scores(&self) -> Vec<f64> {
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        if std_dev <= f64::EPSILON {
            return vec![0.0; self.values.len()];
        }
        self.values.iter().map(|v| (v - mean) / std_dev).collect()
    }
}

fn features(table: &[NormalizedTransaction]) -> Vec<Feature> {
    let mut features = vec![Feature {
        name: "amount",
        values: table.iter().map(|tx| tx.abs_amount).collect(),
    }];

    if table.iter().any(|tx| tx.timestamp.is_some()) {
        features.push(Feature {
            name: "hour",
            values: table
                .iter()
                .map(|tx| tx.timestamp.map_or(DEFAULT_HOUR, |ts| f64::from(ts.hour())))
                .collect(),
        });
        features.push(Feature {
            name: "day_of_week",
            values: table
                .iter()
                .map(|tx| {
                    tx.timestamp.map_or(DEFAULT_DAY_OF_WEEK, |ts| {
                        f64::from(ts.weekday().num_days_from_monday())
                    })
                })
                .collect(),
        });
    }

    features
}

/// Flag outlier rows, most unusual first; empty below ten rows
pub fn detect_anomalies(table: &[NormalizedTransaction]) -> Vec<Anomaly> {
    if table.len() < MIN_ROWS {
        return vec![];
    }

    let features = features(table);
    let z: Vec<Vec<f64>> = features.iter().map(Feature::z_scores).collect();

    let mut candidates: Vec<(usize, f64, Vec<String>)> = table
        .iter()
        .enumerate()
        .filter_map(|(i, _)| {
            let score = z.iter().map(|col| col[i].abs()).fold(0.0, f64::max);
            if score < Z_THRESHOLD {
                return None;
            }
            let unusual = features
                .iter()
                .zip(&z)
                .filter(|(_, col)| col[i].abs() >= Z_THRESHOLD)
                .map(|(feature, _)| feature.name.to_string())
                .collect();
            Some((i, score, unusual))
        })
        .collect();

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let limit = (table.len() as f64 * CONTAMINATION).ceil() as usize;
    candidates.truncate(limit);

    if !candidates.is_empty() {
        tracing::debug!(flagged = candidates.len(), rows = table.len(), "Anomalies found");
    }

    candidates
        .into_iter()
        .map(|(i, score, unusual)| Anomaly {
            id: table[i].id.clone(),
            score: round_to(score, 4),
            amount: table[i].abs_amount,
            unusual,
        })
        .collect()
}
