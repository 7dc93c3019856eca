//! Best-effort parsing of free-text date strings.
//!
//! Scraped pages carry dates in whatever shape the site author chose:
//! ISO timestamps, "March 15, 2024", "Fri, March 15th 2024 at 10:00 AM".
//! [`parse_fuzzy`] tries exact formats first, then falls back to pulling a
//! date-like substring (plus an optional time) out of surrounding prose.
//! Returns `None` for anything that is not date-like — never an error.
//!
//! Timestamps without timezone information are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Naive datetime formats tried against the whole (cleaned) string.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats; matches resolve to midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|\
                           november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"))
}

fn embedded_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b(?:(?:{m})\.?\s+\d{{1,2}},?\s+\d{{4}}|\d{{1,2}}\s+(?:{m})\.?\s+\d{{4}}|\d{{4}}-\d{{2}}-\d{{2}}|\d{{1,2}}/\d{{1,2}}/\d{{4}})\b",
            m = MONTH_NAMES
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

fn embedded_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(am|pm)?").expect("valid regex")
    })
}

/// Best-effort parse of a free-text date string into a UTC timestamp.
///
/// Tries, in order: RFC 3339, RFC 2822, a battery of exact formats, the
/// same battery with ordinal suffixes stripped, and finally extraction of
/// a date-like substring (with optional nearby time) from prose.
pub fn parse_fuzzy(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dt) = parse_exact(trimmed) {
        return Some(dt);
    }

    let cleaned = ordinal_re().replace_all(trimmed, "$1");
    if cleaned != trimmed
        && let Some(dt) = parse_exact(&cleaned)
    {
        return Some(dt);
    }

    parse_embedded(&cleaned)
}

/// Try the whole string against each known format.
fn parse_exact(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Pull a date-like substring out of prose and re-parse it, attaching a
/// nearby `HH:MM` time when one is present.
fn parse_embedded(s: &str) -> Option<DateTime<Utc>> {
    let matched = embedded_date_re().find(s)?;
    let date_part = matched.as_str().replace('.', "");
    let base = parse_exact(&date_part)?;

    // A date-only match resolves to midnight; look for a time elsewhere in
    // the string (e.g. "March 15, 2024 at 10:00 AM").
    if base.time().num_seconds_from_midnight() == 0
        && let Some(caps) = embedded_time_re().captures(s)
    {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let second: u32 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

        match caps.get(4).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(ref p) if p == "pm" && hour != 12 => hour += 12,
            Some(ref p) if p == "am" && hour == 12 => hour = 0,
            _ => {}
        }

        let naive = base.date_naive().and_hms_opt(hour, minute, second)?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    Some(base)
}
