//! Caller-side policies around the stability filter
//!
//! [`StabilityFilter`] reports a confirmed code on every frame where one
//! exists. A scanning screen usually wants exactly one: stop analysing frames
//! and start the product lookup. [`ScanSession`] implements that fire-once
//! policy, and [`SharedStabilityFilter`] serializes frame delivery for hosts
//! whose camera callbacks arrive on several threads.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::filter::{FilterTelemetry, StabilityConfig, StabilityFilter};
use crate::models::{DetectionBatch, ValidCode};

/// Upstream producer of detection batches (camera pipeline, recorded trace, ...)
pub trait BatchSource {
    /// Next frame's detections, or `None` once the source is exhausted
    fn next_batch(&mut self) -> Option<DetectionBatch>;
}

impl<I> BatchSource for I
where
    I: Iterator<Item = DetectionBatch>,
{
    fn next_batch(&mut self) -> Option<DetectionBatch> {
        self.next()
    }
}

/// One scanning session that confirms at most one code
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    filter: StabilityFilter,
    confirmed: Option<ValidCode>,
    frames: usize,
}

impl ScanSession {
    /// Session with the default threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with explicit filter settings
    pub fn with_config(config: StabilityConfig) -> Self {
        Self {
            filter: StabilityFilter::with_config(config),
            confirmed: None,
            frames: 0,
        }
    }

    /// Feed a frame; returns the code only on the frame that confirms it
    ///
    /// Once confirmed, further frames are ignored until [`rearm`](Self::rearm).
    pub fn observe(&mut self, batch: &DetectionBatch) -> Option<&ValidCode> {
        if self.confirmed.is_some() {
            log::trace!("session already confirmed, ignoring frame");
            return None;
        }
        self.frames += 1;
        let valid = self.filter.observe(batch)?;
        log::info!("scan confirmed {} after {} frame(s)", valid.code, self.frames);
        self.confirmed = Some(valid);
        self.confirmed.as_ref()
    }

    /// The confirmed code, if the session has finished
    pub fn confirmed(&self) -> Option<&ValidCode> {
        self.confirmed.as_ref()
    }

    /// Whether the session has confirmed a code
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Frames fed to the filter in the current session
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Filter counters for this session
    pub fn telemetry(&self) -> &FilterTelemetry {
        self.filter.telemetry()
    }

    /// Start scanning again, returning the previous confirmation
    pub fn rearm(&mut self) -> Option<ValidCode> {
        self.filter.reset();
        self.frames = 0;
        self.confirmed.take()
    }
}

/// Pull batches from `source` until the session confirms a code
///
/// Returns `None` if the source runs dry first.
pub fn run_until_confirmed<S>(source: &mut S, session: &mut ScanSession) -> Option<ValidCode>
where
    S: BatchSource + ?Sized,
{
    if let Some(valid) = session.confirmed() {
        return Some(valid.clone());
    }
    while let Some(batch) = source.next_batch() {
        if let Some(valid) = session.observe(&batch) {
            return Some(valid.clone());
        }
    }
    None
}

/// Cloneable handle that serializes access to one filter
#[derive(Debug, Clone, Default)]
pub struct SharedStabilityFilter {
    inner: Arc<Mutex<StabilityFilter>>,
}

impl SharedStabilityFilter {
    /// Wrap a filter for shared use
    pub fn new(filter: StabilityFilter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(filter)),
        }
    }

    /// Observe a frame while holding the lock
    pub fn observe(&self, batch: &DetectionBatch) -> Option<ValidCode> {
        self.lock().observe(batch)
    }

    /// Snapshot of the filter counters
    pub fn telemetry(&self) -> FilterTelemetry {
        *self.lock().telemetry()
    }

    /// Forget every tracked code
    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> MutexGuard<'_, StabilityFilter> {
        // A poisoned lock still hands back the filter
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<StabilityFilter> for SharedStabilityFilter {
    fn from(filter: StabilityFilter) -> Self {
        Self::new(filter)
    }
}
