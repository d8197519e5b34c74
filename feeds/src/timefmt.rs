//! Timestamp text codec
//!
//! Timestamps travel as ISO-8601 with nine fractional digits and a `Z`
//! suffix (`2025-07-17T08:05:03.360677248Z`). Raw integer nanoseconds are
//! accepted on input as well.

use chrono::{DateTime, SecondsFormat, Utc};
use common::Ts;
use std::fmt::Write;

/// Parse timestamp text into nanoseconds since epoch.
///
/// Returns `None` for text that is neither an RFC 3339 timestamp nor a
/// plain integer, and for instants outside the nanosecond-representable
/// range.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<Ts> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return parsed.timestamp_nanos_opt().map(Ts::from_nanos);
    }
    s.parse::<i64>().ok().map(Ts::from_nanos)
}

/// Format a timestamp as ISO-8601 with nine fractional digits
#[must_use]
pub fn format_timestamp(ts: Ts) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ts.as_nanos())
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Append the ISO-8601 form of a timestamp to a string buffer
pub fn write_timestamp(buf: &mut String, ts: Ts) {
    let _ = write!(
        buf,
        "{}",
        DateTime::<Utc>::from_timestamp_nanos(ts.as_nanos()).format("%Y-%m-%dT%H:%M:%S%.9fZ")
    );
}
