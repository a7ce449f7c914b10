//! `BARCODE_STABILITY_MS` override
//!
//! The variable is read once per process, so this file holds a single test
//! and runs as its own test binary.

use barcode_stability::filter::config::THRESHOLD_ENV;
use barcode_stability::{DetectionBatch, StabilityConfig, StabilityFilter};
use std::time::Duration;

/// A numeric value replaces the default threshold
#[test]
fn test_env_threshold_is_applied() {
    unsafe {
        std::env::set_var(THRESHOLD_ENV, "350");
    }
    let config = StabilityConfig::from_env();
    assert_eq!(config.threshold, Duration::from_millis(350));

    let mut filter = StabilityFilter::with_config(config);
    assert!(filter.observe(&DetectionBatch::at_millis(0, ["A"])).is_none());
    assert!(filter.observe(&DetectionBatch::at_millis(300, ["A"])).is_none());
    assert!(filter.observe(&DetectionBatch::at_millis(351, ["A"])).is_some());
}
