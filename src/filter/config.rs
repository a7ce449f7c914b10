use std::sync::OnceLock;
use std::time::Duration;

/// Default continuous-detection window before a code is confirmed
pub const DEFAULT_STABILITY_THRESHOLD: Duration = Duration::from_millis(200);

/// Environment variable overriding the threshold, in milliseconds
pub const THRESHOLD_ENV: &str = "BARCODE_STABILITY_MS";

fn parse_u64(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

fn parse_env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

static ENV_THRESHOLD_MS: OnceLock<Option<u64>> = OnceLock::new();

fn env_threshold_ms() -> Option<u64> {
    *ENV_THRESHOLD_MS.get_or_init(|| parse_env_u64(THRESHOLD_ENV))
}

/// Tuning for [`StabilityFilter`](super::StabilityFilter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityConfig {
    /// A code must be detected for strictly longer than this to be confirmed
    pub threshold: Duration,
}

impl StabilityConfig {
    /// Config with the default 200ms threshold
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_STABILITY_THRESHOLD,
        }
    }

    /// Config read from `BARCODE_STABILITY_MS`, falling back to the default
    ///
    /// The variable is read once per process.
    pub fn from_env() -> Self {
        match env_threshold_ms() {
            Some(ms) => Self::new().with_threshold(Duration::from_millis(ms)),
            None => Self::new(),
        }
    }

    /// Replace the stability threshold
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self::new()
    }
}
