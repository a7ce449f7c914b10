use std::collections::BTreeMap;
use std::time::Duration;

use super::config::StabilityConfig;
use super::telemetry::FilterTelemetry;
use crate::models::{DetectionBatch, TrackedCode, ValidCode};

/// Sliding time-window filter over per-frame barcode detections
///
/// Each code is stamped with the capture time of the first frame in its
/// current unbroken streak. A single frame without the code ends the streak.
/// A code is confirmed once its streak is strictly longer than the configured
/// threshold; among several confirmed codes the one whose streak started last
/// wins.
///
/// # Example
/// ```
/// use barcode_stability::{DetectionBatch, StabilityFilter};
///
/// let mut filter = StabilityFilter::new();
/// assert!(filter.observe(&DetectionBatch::at_millis(0, ["A"])).is_none());
/// assert!(filter.observe(&DetectionBatch::at_millis(100, ["A"])).is_none());
/// let valid = filter.observe(&DetectionBatch::at_millis(250, ["A"])).unwrap();
/// assert_eq!(valid.as_str(), "A");
/// ```
#[derive(Debug, Clone)]
pub struct StabilityFilter {
    config: StabilityConfig,
    /// Code -> streak start. Keys mirror the latest batch.
    tracked: BTreeMap<String, Duration>,
    last_capture: Option<Duration>,
    telemetry: FilterTelemetry,
}

impl StabilityFilter {
    /// Create a filter with the default 200ms threshold
    pub fn new() -> Self {
        Self::with_config(StabilityConfig::default())
    }

    /// Create a filter with explicit settings
    pub fn with_config(config: StabilityConfig) -> Self {
        Self {
            config,
            tracked: BTreeMap::new(),
            last_capture: None,
            telemetry: FilterTelemetry::default(),
        }
    }

    /// Feed one frame's detections and return the confirmed code, if any
    pub fn observe(&mut self, batch: &DetectionBatch) -> Option<ValidCode> {
        let now = batch.captured_at();
        self.telemetry.batches += 1;

        if let Some(prev) = self.last_capture {
            if now < prev {
                self.telemetry.clock_regressions += 1;
                log::debug!("capture time went backwards: {:?} -> {:?}", prev, now);
            }
        }
        self.last_capture = Some(now);

        let mut next = BTreeMap::new();
        for code in batch.codes() {
            if code.is_empty() {
                self.telemetry.discarded_codes += 1;
                continue;
            }
            let first_seen = self.tracked.get(code).copied().unwrap_or(now);
            next.insert(code.to_owned(), first_seen);
        }

        let dropped = self
            .tracked
            .keys()
            .filter(|code| !next.contains_key(code.as_str()))
            .count();
        if dropped > 0 {
            log::trace!("{} code(s) left view at {:?}", dropped, now);
        }
        self.telemetry.streak_resets += dropped;
        if next.is_empty() {
            self.telemetry.empty_batches += 1;
        }
        self.tracked = next;

        let threshold = self.config.threshold;
        let valid = self
            .tracked()
            .filter(|tracked| tracked.elapsed(now) > threshold)
            .max_by_key(|tracked| tracked.first_seen)
            .map(|tracked| ValidCode {
                code: tracked.code.to_owned(),
                first_seen: tracked.first_seen,
                stable_for: tracked.elapsed(now),
            });

        if let Some(valid) = &valid {
            self.telemetry.confirmations += 1;
            log::debug!(
                "confirmed {} after {:?} of continuous detection",
                valid.code,
                valid.stable_for
            );
        }

        valid
    }

    /// Codes in the current streak, ordered by content
    pub fn tracked(&self) -> impl Iterator<Item = TrackedCode<'_>> {
        self.tracked.iter().map(|(code, &first_seen)| TrackedCode {
            code: code.as_str(),
            first_seen,
        })
    }

    /// Number of codes currently tracked
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    /// Whether a code is part of the current streak
    pub fn is_tracking(&self, code: &str) -> bool {
        self.tracked.contains_key(code)
    }

    /// Active settings
    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Counters accumulated since construction
    pub fn telemetry(&self) -> &FilterTelemetry {
        &self.telemetry
    }

    /// Forget every tracked code (telemetry is kept)
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.last_capture = None;
    }
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self::new()
    }
}
