//! Grouping records into per-calendar buckets.
//!
//! Groups are ephemeral: recomputed on every run, keyed by a normalized
//! string, never persisted. `BTreeMap` keeps the grouped output order
//! deterministic across runs.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use eventharvest_shared::{EventRecord, UNKNOWN_LOCATION};

/// Bucket records by normalized location key. Unscheduled records are
/// grouped like any other; an empty location maps to `"Unknown"`.
pub fn group_by_location(records: &[EventRecord]) -> BTreeMap<String, Vec<EventRecord>> {
    let mut groups: BTreeMap<String, Vec<EventRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(location_key(&record.location))
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Bucket records by `YYYY-MM` of their start timestamp. Records without
/// a start are not placed in any bucket.
pub fn group_by_month(records: &[EventRecord]) -> BTreeMap<String, Vec<EventRecord>> {
    let mut groups: BTreeMap<String, Vec<EventRecord>> = BTreeMap::new();
    for record in records {
        if let Some(start) = record.start {
            groups
                .entry(start.format("%Y-%m").to_string())
                .or_default()
                .push(record.clone());
        }
    }
    groups
}

/// Normalize a free-text location to a grouping key.
///
/// Heuristic: in "street, city" strings the trailing segment is the city,
/// so a comma-containing location keys on its last non-empty comma
/// segment; anything else keys on the trimmed string itself.
pub fn location_key(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return UNKNOWN_LOCATION.to_string();
    }

    if trimmed.contains(',')
        && let Some(last) = trimmed
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .next_back()
    {
        return last.to_string();
    }

    trimmed.to_string()
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"))
}

/// Reduce a location grouping key to a filesystem-safe filename token:
/// strip everything outside word/space/hyphen classes, trim, and replace
/// spaces with underscores.
pub fn sanitize_location_token(key: &str) -> String {
    token_re()
        .replace_all(key, "")
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(title: &str, location: &str) -> EventRecord {
        EventRecord::new(title).with_location(location)
    }

    #[test]
    fn location_key_takes_last_comma_segment() {
        assert_eq!(location_key("123 Main St, Springfield"), "Springfield");
        assert_eq!(
            location_key("Room 4, Town Hall, Springfield"),
            "Springfield"
        );
        // Trailing empty segment is skipped.
        assert_eq!(location_key("123 Main St, Springfield, "), "Springfield");
    }

    #[test]
    fn location_key_without_comma_is_trimmed_string() {
        assert_eq!(location_key("Springfield"), "Springfield");
        assert_eq!(location_key("  Springfield  "), "Springfield");
    }

    #[test]
    fn empty_location_maps_to_unknown() {
        assert_eq!(location_key(""), "Unknown");
        assert_eq!(location_key("   "), "Unknown");
    }

    #[test]
    fn groups_by_normalized_location() {
        let records = vec![
            at("A", "123 Main St, Springfield"),
            at("B", "Springfield"),
            at("C", "Shelbyville"),
            at("D", ""),
        ];

        let groups = group_by_location(&records);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups["Springfield"].len(), 2);
        assert_eq!(groups["Shelbyville"].len(), 1);
        assert_eq!(groups["Unknown"].len(), 1);
    }

    #[test]
    fn groups_by_month_and_skips_unscheduled() {
        let records = vec![
            EventRecord::new("March A").with_start("2024-03-15T10:00:00Z".parse().unwrap()),
            EventRecord::new("March B").with_start("2024-03-20T18:00:00Z".parse().unwrap()),
            EventRecord::new("April").with_start("2024-04-01T09:00:00Z".parse().unwrap()),
            EventRecord::new("Unscheduled"),
        ];

        let groups = group_by_month(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["2024-03"].len(), 2);
        assert_eq!(groups["2024-04"].len(), 1);

        let bucketed: usize = groups.values().map(Vec::len).sum();
        assert_eq!(bucketed, 3);
    }

    #[test]
    fn sanitizes_location_tokens_for_filenames() {
        assert_eq!(sanitize_location_token("Springfield"), "Springfield");
        assert_eq!(sanitize_location_token("New York"), "New_York");
        assert_eq!(sanitize_location_token("St. Gallen!"), "St_Gallen");
        assert_eq!(
            sanitize_location_token("Winston-Salem"),
            "Winston-Salem"
        );
    }
}
