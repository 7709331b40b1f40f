use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::process::utils::clean_str;

/// Naive layouts accepted for the posting timestamp, tried in order.
/// `%.f` also accepts a missing fractional part.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a posting timestamp into local wall-clock time.
///
/// Naive values are taken as-is. Values carrying an offset (RFC 3339) are
/// converted to the local zone so they compare against a local `now`.
/// A bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a timestamp for output: `YYYY-MM-DD HH:MM:SS`, with microseconds
/// only when the value has a fractional part.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}
