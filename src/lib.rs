//! barcode_stability - settle flickering barcode detections into one code
//!
//! Camera-based barcode readers report whatever they see in each frame. A code
//! can appear for a frame, vanish, and reappear; two products can be in view at
//! once. [`StabilityFilter`] turns that stream into a single confirmed code once
//! it has stayed continuously in view for longer than a fixed window (200ms by
//! default), which is the point where a scanning screen triggers its product
//! lookup.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Stability filter, its configuration and counters
pub mod filter;
/// Core data structures (DetectionBatch, TrackedCode, ValidCode)
pub mod models;
/// Fire-once sessions, shared handles and batch sources
pub mod session;
/// Trace files and offline replay
pub mod trace;

pub use filter::{FilterTelemetry, StabilityConfig, StabilityFilter};
pub use models::{DetectionBatch, TrackedCode, ValidCode};
pub use session::{BatchSource, ScanSession, SharedStabilityFilter, run_until_confirmed};

/// Feed batches through a fresh filter and return the first confirmed code
///
/// # Arguments
/// * `batches` - Frames in capture order
/// * `config` - Filter settings
///
/// # Returns
/// The first code confirmed, or `None` if no code ever settled
pub fn confirm_first<'a, I>(batches: I, config: StabilityConfig) -> Option<ValidCode>
where
    I: IntoIterator<Item = &'a DetectionBatch>,
{
    let mut filter = StabilityFilter::with_config(config);
    batches.into_iter().find_map(|batch| filter.observe(batch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_first_none_for_empty_stream() {
        let batches: Vec<DetectionBatch> = Vec::new();
        assert!(confirm_first(&batches, StabilityConfig::default()).is_none());
    }

    #[test]
    fn test_confirm_first() {
        let batches = vec![
            DetectionBatch::at_millis(0, ["5901234123457"]),
            DetectionBatch::at_millis(120, ["5901234123457"]),
            DetectionBatch::at_millis(240, ["5901234123457"]),
        ];
        let valid = confirm_first(&batches, StabilityConfig::default()).unwrap();
        assert_eq!(valid.as_str(), "5901234123457");
        assert_eq!(valid.first_seen, std::time::Duration::ZERO);
    }
}
