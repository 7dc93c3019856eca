//! The filter engine: pure functions over record lists.
//!
//! Stages run in a fixed order — location, then keyword, then date range —
//! and each stage only runs when its `enabled` flag is set; a disabled
//! stage is the identity. Within a stage, exclusion is checked before
//! inclusion, so a record matching both an exclude and an include term is
//! dropped.
//!
//! Matching is case-insensitive substring containment. That means an
//! exclude term of "art" also drops "party" — inherited behavior, kept
//! deliberately rather than silently switching to word matching.

use tracing::debug;

use eventharvest_shared::{DateRangeConfig, EventRecord, FilterConfig, TermFilterConfig, dates};

/// Apply all enabled filter stages, in order.
pub fn apply(records: Vec<EventRecord>, config: &FilterConfig) -> Vec<EventRecord> {
    let mut filtered = records;

    if config.locations.enabled {
        let before = filtered.len();
        filtered = filter_by_location(filtered, &config.locations);
        debug!(before, after = filtered.len(), "location filter applied");
    }

    if config.keywords.enabled {
        let before = filtered.len();
        filtered = filter_by_keywords(filtered, &config.keywords);
        debug!(before, after = filtered.len(), "keyword filter applied");
    }

    if config.date_range.enabled {
        let before = filtered.len();
        filtered = filter_by_date_range(filtered, &config.date_range);
        debug!(before, after = filtered.len(), "date-range filter applied");
    }

    filtered
}

/// Two-phase term check: exclusion first (and it always wins), then
/// inclusion — an empty include list lets everything through.
fn passes_terms(field: &str, terms: &TermFilterConfig) -> bool {
    let field = field.to_lowercase();

    if terms
        .exclude
        .iter()
        .any(|term| field.contains(&term.to_lowercase()))
    {
        return false;
    }

    if terms.include.is_empty() {
        return true;
    }

    terms
        .include
        .iter()
        .any(|term| field.contains(&term.to_lowercase()))
}

fn filter_by_location(records: Vec<EventRecord>, terms: &TermFilterConfig) -> Vec<EventRecord> {
    records
        .into_iter()
        .filter(|record| passes_terms(&record.location, terms))
        .collect()
}

fn filter_by_keywords(records: Vec<EventRecord>, terms: &TermFilterConfig) -> Vec<EventRecord> {
    records
        .into_iter()
        .filter(|record| {
            let text = format!("{} {}", record.title, record.description);
            passes_terms(&text, terms)
        })
        .collect()
}

/// Drop records outside the configured start-timestamp range. Bounds are
/// parsed once per call; an unparsable bound degrades to "no bound".
/// Records without a start never pass this stage.
fn filter_by_date_range(records: Vec<EventRecord>, range: &DateRangeConfig) -> Vec<EventRecord> {
    let lower = dates::parse_fuzzy(&range.start_date);
    let upper = dates::parse_fuzzy(&range.end_date);

    records
        .into_iter()
        .filter(|record| match record.start {
            None => false,
            Some(start) => {
                lower.is_none_or(|bound| start >= bound)
                    && upper.is_none_or(|bound| start <= bound)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(title: &str) -> EventRecord {
        EventRecord::new(title)
    }

    fn scheduled(title: &str, iso: &str) -> EventRecord {
        EventRecord::new(title).with_start(iso.parse().expect("valid timestamp"))
    }

    fn titles(records: &[EventRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn all_stages_disabled_is_identity() {
        let records = vec![
            record("Jazz Night").with_location("Springfield"),
            record("Python Workshop"),
            scheduled("Art Fair", "2030-01-01T00:00:00Z"),
        ];

        let out = apply(records.clone(), &FilterConfig::default());
        assert_eq!(out, records);
    }

    #[test]
    fn keyword_exclude_drops_matching_titles() {
        let config = FilterConfig {
            keywords: TermFilterConfig {
                enabled: true,
                include: vec![],
                exclude: vec!["workshop".into()],
            },
            ..FilterConfig::default()
        };

        let out = apply(
            vec![record("Jazz Night"), record("Python Workshop")],
            &config,
        );
        assert_eq!(titles(&out), vec!["Jazz Night"]);
    }

    #[test]
    fn exclude_wins_over_include() {
        let config = FilterConfig {
            keywords: TermFilterConfig {
                enabled: true,
                include: vec!["jazz".into()],
                exclude: vec!["night".into()],
            },
            ..FilterConfig::default()
        };

        // Matches both: the exclusion wins.
        let out = apply(vec![record("Jazz Night")], &config);
        assert!(out.is_empty());
    }

    #[test]
    fn include_list_requires_at_least_one_match() {
        let config = FilterConfig {
            keywords: TermFilterConfig {
                enabled: true,
                include: vec!["music".into(), "jazz".into()],
                exclude: vec![],
            },
            ..FilterConfig::default()
        };

        let out = apply(
            vec![
                record("Jazz Night"),
                record("Chess Tournament"),
                record("Live Music Afternoon"),
            ],
            &config,
        );
        assert_eq!(titles(&out), vec!["Jazz Night", "Live Music Afternoon"]);
    }

    #[test]
    fn keyword_match_searches_description_too() {
        let config = FilterConfig {
            keywords: TermFilterConfig {
                enabled: true,
                include: vec!["vinyl".into()],
                exclude: vec![],
            },
            ..FilterConfig::default()
        };

        let out = apply(
            vec![record("Record Fair").with_description("Vinyl and more")],
            &config,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn substring_matching_is_literal() {
        // Excluding "art" also drops "Party" — inherited limitation.
        let config = FilterConfig {
            keywords: TermFilterConfig {
                enabled: true,
                include: vec![],
                exclude: vec!["art".into()],
            },
            ..FilterConfig::default()
        };

        let out = apply(vec![record("Block Party"), record("Quiz Night")], &config);
        assert_eq!(titles(&out), vec!["Quiz Night"]);
    }

    #[test]
    fn location_filter_ignores_missing_start() {
        let config = FilterConfig {
            locations: TermFilterConfig {
                enabled: true,
                include: vec!["springfield".into()],
                exclude: vec![],
            },
            ..FilterConfig::default()
        };

        // Unscheduled records still pass location filtering.
        let out = apply(
            vec![
                record("TBA Gig").with_location("Springfield"),
                record("Far Away").with_location("Shelbyville"),
            ],
            &config,
        );
        assert_eq!(titles(&out), vec!["TBA Gig"]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let config = FilterConfig {
            date_range: DateRangeConfig {
                enabled: true,
                start_date: "2024-03-01".into(),
                end_date: "2024-03-31".into(),
            },
            ..FilterConfig::default()
        };

        let boundary = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let out = apply(
            vec![
                EventRecord::new("On Lower Bound").with_start(boundary),
                scheduled("Inside", "2024-03-15T12:00:00Z"),
                scheduled("Before", "2024-02-29T23:59:59Z"),
                scheduled("After", "2024-04-01T00:00:00Z"),
                record("Unscheduled"),
            ],
            &config,
        );
        assert_eq!(titles(&out), vec!["On Lower Bound", "Inside"]);
    }

    #[test]
    fn unparsable_bounds_degrade_to_no_bound() {
        let config = FilterConfig {
            date_range: DateRangeConfig {
                enabled: true,
                start_date: "not a date".into(),
                end_date: String::new(),
            },
            ..FilterConfig::default()
        };

        // No usable bounds: everything scheduled passes, unscheduled drops.
        let out = apply(
            vec![
                scheduled("Any Time", "1999-01-01T00:00:00Z"),
                record("Unscheduled"),
            ],
            &config,
        );
        assert_eq!(titles(&out), vec!["Any Time"]);
    }
}
