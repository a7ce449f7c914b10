use serde::Serialize;
use std::time::Duration;

/// A barcode in the current unbroken detection streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedCode<'a> {
    /// Barcode content
    pub code: &'a str,
    /// Capture time of the first frame of the streak
    pub first_seen: Duration,
}

impl TrackedCode<'_> {
    /// Time the code has been continuously detected as of `now`
    ///
    /// Clamped to zero when `now` precedes the streak start.
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.first_seen)
    }
}

/// A barcode that stayed in view longer than the stability threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidCode {
    /// Barcode content
    pub code: String,
    /// Start of the streak that confirmed the code
    #[serde(serialize_with = "serialize_millis")]
    pub first_seen: Duration,
    /// How long the code had been stable at confirmation time
    #[serde(serialize_with = "serialize_millis")]
    pub stable_for: Duration,
}

impl ValidCode {
    /// Barcode content as a string slice
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Consume and return the barcode content
    pub fn into_code(self) -> String {
        self.code
    }
}

impl std::fmt::Display for ValidCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

pub(crate) fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(value.as_nanos() as f64 / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_saturates() {
        let tracked = TrackedCode {
            code: "A",
            first_seen: Duration::from_millis(300),
        };
        assert_eq!(tracked.elapsed(Duration::from_millis(520)), Duration::from_millis(220));
        assert_eq!(tracked.elapsed(Duration::from_millis(100)), Duration::ZERO);
    }

    #[test]
    fn test_valid_code_json_uses_millis() {
        let valid = ValidCode {
            code: "A".to_string(),
            first_seen: Duration::from_millis(300),
            stable_for: Duration::from_millis(220),
        };
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json["code"], "A");
        assert_eq!(json["first_seen"], 300.0);
        assert_eq!(json["stable_for"], 220.0);
    }
}
