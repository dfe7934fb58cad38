//! Forensic engine - orchestrates normalization, detection, scoring and metrics

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::anomaly::detect_anomalies;
use crate::config::EngineConfig;
use crate::detect::{builtin_detectors, DetectionContext, Detector};
use crate::inclusion::{inclusion_score, stakeholder_metrics};
use crate::models::{AnalysisReport, Leak, NormalizedTransaction, RawTransaction};
use crate::momo::{inclusion_tax, momo_patterns};
use crate::normalize::normalize;
use crate::profile::spending_profile;
use crate::score::{band, score, summarize};

/// The main engine that runs every registered detector and builds the report
pub struct ForensicEngine {
    detectors: Vec<Box<dyn Detector>>,
    config: EngineConfig,
}

impl Default for ForensicEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForensicEngine {
    /// Create an engine with the built-in detectors and default config
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut engine = Self {
            detectors: vec![],
            config,
        };

        for detector in builtin_detectors() {
            engine.register(detector);
        }

        for name in &engine.config.disabled_detectors {
            if !engine
                .detectors
                .iter()
                .any(|d| d.name().eq_ignore_ascii_case(name))
            {
                warn!(detector = name.as_str(), "Unknown detector in disabled list");
            }
        }

        engine
    }

    /// Register a detector; it runs after those already registered
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Names of registered detectors in run order
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn is_enabled(&self, detector: &str) -> bool {
        !self.config.is_disabled(detector)
    }

    /// Analyze against the current wall-clock time
    pub fn analyze(&self, records: &[RawTransaction]) -> AnalysisReport {
        self.analyze_at(records, Utc::now())
    }

    /// Analyze with an injected reference instant
    ///
    /// Identical records and instant always produce an identical report.
    pub fn analyze_at(&self, records: &[RawTransaction], now: DateTime<Utc>) -> AnalysisReport {
        let table = normalize(records);
        self.analyze_table(&table, now)
    }

    /// Analyze an already-normalized table
    pub fn analyze_table(&self, table: &[NormalizedTransaction], now: DateTime<Utc>) -> AnalysisReport {
        let ctx = DetectionContext::new(table, now, &self.config);
        let leaks = self.run_detectors(&ctx);

        let health_score = score(table, &leaks, &self.config.scoring);
        let health_band = band(health_score, &self.config.scoring);
        let summary = summarize(health_score, health_band, &leaks);

        let inclusion = inclusion_score(&ctx, &leaks);
        let metrics = stakeholder_metrics(&inclusion, &leaks);

        info!(
            transactions = table.len(),
            leaks = leaks.len(),
            score = health_score,
            band = health_band.as_str(),
            "Analysis complete"
        );

        AnalysisReport {
            financial_health_score: health_score,
            health_band,
            leaks,
            summary,
            inclusion_score: inclusion,
            stakeholder_metrics: metrics,
            inclusion_tax: inclusion_tax(table),
            momo_patterns: momo_patterns(table),
            spending_profile: spending_profile(table),
            anomalies: detect_anomalies(table),
        }
    }

    /// Run enabled detectors in registration order and concatenate their leaks
    pub fn run_detectors(&self, ctx: &DetectionContext<'_>) -> Vec<Leak> {
        let mut all_leaks = vec![];

        for detector in &self.detectors {
            if !self.is_enabled(detector.name()) {
                debug!(detector = detector.name(), "Detector disabled, skipping");
                continue;
            }

            let leaks = detector.detect(ctx);
            debug!(
                detector = detector.name(),
                count = leaks.len(),
                "Detector complete"
            );
            all_leaks.extend(leaks);
        }

        all_leaks
    }
}
