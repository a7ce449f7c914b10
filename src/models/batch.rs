use std::collections::BTreeSet;
use std::time::Duration;

/// Barcodes detected in a single camera frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionBatch {
    /// Raw barcode strings (duplicates within a frame collapse)
    codes: BTreeSet<String>,
    /// Monotonic capture time of the frame
    captured_at: Duration,
}

impl DetectionBatch {
    /// Create a batch from the codes seen in one frame
    pub fn new<I, S>(captured_at: Duration, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            captured_at,
        }
    }

    /// A frame in which nothing was detected
    pub fn empty(captured_at: Duration) -> Self {
        Self {
            codes: BTreeSet::new(),
            captured_at,
        }
    }

    /// Convenience constructor for millisecond timestamps
    pub fn at_millis<I, S>(millis: u64, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Duration::from_millis(millis), codes)
    }

    /// Capture time of the frame
    pub fn captured_at(&self) -> Duration {
        self.captured_at
    }

    /// Iterate the distinct raw codes, including empty strings
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Number of distinct raw codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True when the frame produced no detections at all
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check whether the frame contains a code
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }
}
