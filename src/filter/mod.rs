//! Temporal stability filtering of per-frame detections

/// Threshold settings and environment overrides
pub mod config;
/// The stability filter itself
pub mod stability;
/// Per-filter counters
pub mod telemetry;

pub use config::{DEFAULT_STABILITY_THRESHOLD, StabilityConfig};
pub use stability::StabilityFilter;
pub use telemetry::FilterTelemetry;
