use serde::Serialize;

/// Counters collected while observing batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterTelemetry {
    /// Batches passed to `observe`
    pub batches: usize,
    /// Batches without a single non-empty code
    pub empty_batches: usize,
    /// Empty-string codes that were discarded
    pub discarded_codes: usize,
    /// Tracked codes dropped because a frame missed them
    pub streak_resets: usize,
    /// Batches that yielded a confirmed code
    pub confirmations: usize,
    /// Batches captured earlier than the one before them
    pub clock_regressions: usize,
}

impl FilterTelemetry {
    /// Fraction of observed batches that produced a confirmation
    pub fn confirmation_ratio(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.confirmations as f64 / self.batches as f64
        }
    }
}
