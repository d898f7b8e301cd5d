//! Lenient calendar parsing for the `date` front matter field.
//!
//! Dates only order blog posts, so an unparseable value is not an error:
//! callers get `None` and sort the document last.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts accepted in front matter.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Date-time layouts accepted in front matter (without offset).
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a front matter date into a comparable value.
///
/// | Input | Parsed |
/// |-------|--------|
/// | `2024-03-01` | midnight of that day |
/// | `2024-03-01T10:30:00Z` | UTC instant (RFC 3339) |
/// | `2024-03-01 10:30` | local wall time |
/// | `Fri, 01 Mar 2024 10:30:00 GMT` | RFC 2822 |
/// | `March 1, 2024` | midnight of that day |
/// | `soon` | `None` |
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
