//! Recorded detector output and offline replay
//!
//! A trace holds one frame per line: the capture time in milliseconds
//! followed by the codes detected in that frame.
//!
//! ```text
//! # shelf scan, phone held still after 90ms
//! 0
//! 33.3 4006381333931
//! 66.6 4006381333931 737628064502
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::filter::{FilterTelemetry, StabilityConfig, StabilityFilter};
use crate::models::code::serialize_millis;
use crate::models::DetectionBatch;
use crate::session::ScanSession;

/// Errors produced while loading a trace
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    /// The leading token is not a non-negative millisecond value
    #[error("line {line}: invalid capture time {token:?}")]
    InvalidTimestamp {
        /// 1-based line number
        line: usize,
        /// Offending token
        token: String,
    },
    /// Capture times must not decrease from one frame to the next
    #[error("line {line}: capture time {current_ms}ms precedes previous frame at {previous_ms}ms")]
    NonMonotonic {
        /// 1-based line number
        line: usize,
        /// Previous frame time
        previous_ms: f64,
        /// Time on this line
        current_ms: f64,
    },
}

fn parse_millis(token: &str) -> Option<Duration> {
    let ms = token.parse::<f64>().ok()?;
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    let nanos = (ms * 1_000_000.0).round();
    if nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}

fn as_millis_f64(value: Duration) -> f64 {
    value.as_nanos() as f64 / 1_000_000.0
}

/// Parse trace text into detection batches
pub fn parse_trace(content: &str) -> Result<Vec<DetectionBatch>, TraceError> {
    let mut batches = Vec::new();
    let mut previous: Option<Duration> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(time_token) = tokens.next() else {
            continue;
        };
        let captured_at =
            parse_millis(time_token).ok_or_else(|| TraceError::InvalidTimestamp {
                line: idx + 1,
                token: time_token.to_string(),
            })?;

        if let Some(prev) = previous {
            if captured_at < prev {
                return Err(TraceError::NonMonotonic {
                    line: idx + 1,
                    previous_ms: as_millis_f64(prev),
                    current_ms: as_millis_f64(captured_at),
                });
            }
        }
        previous = Some(captured_at);

        batches.push(DetectionBatch::new(captured_at, tokens));
    }

    Ok(batches)
}

/// Read and parse a trace file
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<DetectionBatch>, TraceError> {
    let content = fs::read_to_string(path)?;
    parse_trace(&content)
}

/// How a trace is replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
    /// Stop at the first confirmation, as a scanning screen would
    #[default]
    FirstConfirmation,
    /// Feed every frame and report each one that yields a code
    EveryFrame,
}

/// A frame on which the filter reported a code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameConfirmation {
    /// 0-based frame index within the trace
    pub frame: usize,
    /// Capture time of the frame
    #[serde(serialize_with = "serialize_millis")]
    pub captured_at: Duration,
    /// Confirmed code
    pub code: String,
    /// Streak length at confirmation
    #[serde(serialize_with = "serialize_millis")]
    pub stable_for: Duration,
}

/// Outcome of replaying one trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Frames fed to the filter
    pub frames_processed: usize,
    /// Frames in the trace
    pub frames_total: usize,
    /// Confirmations in frame order
    pub confirmations: Vec<FrameConfirmation>,
    /// Filter counters after the replay
    pub telemetry: FilterTelemetry,
}

impl ReplayReport {
    /// First confirmed frame, if any
    pub fn first(&self) -> Option<&FrameConfirmation> {
        self.confirmations.first()
    }
}

/// Run recorded batches through a fresh filter
pub fn replay(
    batches: &[DetectionBatch],
    config: StabilityConfig,
    mode: ReplayMode,
) -> ReplayReport {
    let mut confirmations = Vec::new();

    let (frames_processed, telemetry) = match mode {
        ReplayMode::FirstConfirmation => {
            let mut session = ScanSession::with_config(config);
            for (frame, batch) in batches.iter().enumerate() {
                if let Some(valid) = session.observe(batch) {
                    confirmations.push(FrameConfirmation {
                        frame,
                        captured_at: batch.captured_at(),
                        code: valid.code.clone(),
                        stable_for: valid.stable_for,
                    });
                    break;
                }
            }
            (session.frames(), *session.telemetry())
        }
        ReplayMode::EveryFrame => {
            let mut filter = StabilityFilter::with_config(config);
            for (frame, batch) in batches.iter().enumerate() {
                if let Some(valid) = filter.observe(batch) {
                    confirmations.push(FrameConfirmation {
                        frame,
                        captured_at: batch.captured_at(),
                        code: valid.code,
                        stable_for: valid.stable_for,
                    });
                }
            }
            (batches.len(), *filter.telemetry())
        }
    };

    ReplayReport {
        frames_processed,
        frames_total: batches.len(),
        confirmations,
        telemetry,
    }
}
