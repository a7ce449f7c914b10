//! Integration tests for the barcode stability filter
//!
//! These tests drive the public API with frame sequences shaped like real
//! camera output: steady holds, single dropped frames, and two products in
//! view at once. They protect the streak and tie-break rules that decide when
//! a scanning screen fires its lookup.

use barcode_stability::trace::{ReplayMode, parse_trace, replay};
use barcode_stability::{
    DetectionBatch, ScanSession, SharedStabilityFilter, StabilityConfig, StabilityFilter,
    ValidCode,
};
use std::time::Duration;

fn observe(filter: &mut StabilityFilter, millis: u64, codes: &[&str]) -> Option<String> {
    filter
        .observe(&DetectionBatch::at_millis(millis, codes.iter().copied()))
        .map(ValidCode::into_code)
}

/// The worked example: confirm, drop, reacquire, confirm again
#[test]
fn test_worked_example() {
    let mut filter = StabilityFilter::new();
    assert_eq!(observe(&mut filter, 0, &["A"]), None);
    assert_eq!(observe(&mut filter, 100, &["A"]), None);
    assert_eq!(observe(&mut filter, 250, &["A"]), Some("A".to_string()));
    assert_eq!(observe(&mut filter, 260, &[]), None);
    assert_eq!(filter.tracked_len(), 0);
    assert_eq!(observe(&mut filter, 300, &["A"]), None);
    assert_eq!(observe(&mut filter, 520, &["A"]), Some("A".to_string()));
}

/// A steady hold confirms on the first frame past the window and never before
#[test]
fn test_steady_hold_at_30fps() {
    let mut filter = StabilityFilter::new();
    let mut first_hit = None;
    for frame in 0..20u64 {
        let t = frame * 33;
        let result = observe(&mut filter, t, &["4006381333931"]);
        if first_hit.is_none() {
            if t > 200 {
                assert_eq!(result.as_deref(), Some("4006381333931"), "frame at {}ms", t);
                first_hit = Some(t);
            } else {
                assert_eq!(result, None, "frame at {}ms", t);
            }
        }
    }
    assert_eq!(first_hit, Some(231));
}

/// One missed frame restarts the clock; there is no grace period
#[test]
fn test_dropped_frame_restarts_streak() {
    let mut filter = StabilityFilter::new();
    observe(&mut filter, 0, &["A"]);
    observe(&mut filter, 100, &["A"]);
    observe(&mut filter, 180, &["B"]);
    assert_eq!(observe(&mut filter, 210, &["A"]), None);
    assert_eq!(observe(&mut filter, 400, &["A"]), None);
    assert_eq!(observe(&mut filter, 411, &["A"]), Some("A".to_string()));
}

/// Two qualifying codes: the one whose streak started later wins
#[test]
fn test_two_products_in_view() {
    let mut filter = StabilityFilter::new();
    observe(&mut filter, 0, &["A"]);
    observe(&mut filter, 40, &["A", "B"]);
    observe(&mut filter, 120, &["A", "B"]);
    assert_eq!(observe(&mut filter, 230, &["A", "B"]), Some("A".to_string()));
    assert_eq!(observe(&mut filter, 241, &["A", "B"]), Some("B".to_string()));
}

/// An empty frame always clears everything
#[test]
fn test_empty_batch_clears() {
    let mut filter = StabilityFilter::new();
    observe(&mut filter, 0, &["A", "B", "C"]);
    assert_eq!(filter.tracked_len(), 3);
    assert_eq!(observe(&mut filter, 500, &[]), None);
    assert_eq!(filter.tracked_len(), 0);
}

/// Empty strings are dropped before tracking
#[test]
fn test_empty_string_never_confirmed() {
    let mut filter = StabilityFilter::new();
    for t in [0, 100, 300, 600] {
        assert_ne!(observe(&mut filter, t, &["", "A"]), Some(String::new()));
    }
    assert!(!filter.is_tracking(""));
    assert!(filter.is_tracking("A"));
}

#[test]
fn test_custom_threshold() {
    let config = StabilityConfig::new().with_threshold(Duration::from_millis(500));
    let mut filter = StabilityFilter::with_config(config);
    observe(&mut filter, 0, &["A"]);
    assert_eq!(observe(&mut filter, 300, &["A"]), None);
    assert_eq!(observe(&mut filter, 501, &["A"]), Some("A".to_string()));
}

#[test]
fn test_session_matches_trace_replay() {
    let trace = "0 A\n100 A\n250 A B\n300 A B\n";
    let batches = parse_trace(trace).unwrap();

    let mut session = ScanSession::new();
    let confirmed: Vec<String> = batches
        .iter()
        .filter_map(|batch| session.observe(batch).map(|valid| valid.code.clone()))
        .collect();
    assert_eq!(confirmed, vec!["A".to_string()]);

    let report = replay(&batches, StabilityConfig::default(), ReplayMode::FirstConfirmation);
    assert_eq!(report.first().map(|c| c.code.as_str()), Some("A"));
    assert_eq!(report.frames_processed, 3);
}

#[test]
fn test_shared_filter_behaves_like_owned() {
    let shared = SharedStabilityFilter::from(StabilityFilter::new());
    assert!(shared.observe(&DetectionBatch::at_millis(0, ["A"])).is_none());
    let valid = shared.observe(&DetectionBatch::at_millis(250, ["A"])).unwrap();
    assert_eq!(valid.as_str(), "A");
    assert_eq!(shared.telemetry().confirmations, 1);
}
