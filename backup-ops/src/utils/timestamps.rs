//! Timestamp helpers for results and lifecycle events.

use chrono::{DateTime, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp as ISO 8601 string.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns the milliseconds elapsed between `start` and `end`, clamped at
/// zero when the clock went backwards.
#[must_use]
pub fn duration_ms(start: &Timestamp, end: &Timestamp) -> u64 {
    u64::try_from((*end - *start).num_milliseconds()).unwrap_or(0)
}
