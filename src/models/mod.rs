/// One frame's detections
pub mod batch;
/// Tracked and confirmed codes
pub mod code;

pub use batch::DetectionBatch;
pub use code::{TrackedCode, ValidCode};
