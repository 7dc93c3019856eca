//! Core domain types for EventHarvest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel grouping key for records with an empty location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// A normalized event as produced by a source.
///
/// Records are value objects: a source builds one, the pipeline transforms
/// lists of them, and they are discarded after encoding. Every record leaving
/// a source has a non-empty `title`; `start` may be absent when a
/// structured-metadata source could not parse a date — such records are
/// excluded from date filtering, month grouping, and calendar encoding, but
/// still pass through location/keyword filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event title/summary. Never empty past the source boundary.
    pub title: String,

    /// When the event starts. `None` means "unscheduled".
    pub start: Option<DateTime<Utc>>,

    /// When the event ends, if known.
    pub end: Option<DateTime<Utc>>,

    /// Free-text venue/location. May be empty.
    #[serde(default)]
    pub location: String,

    /// Event description. May be empty.
    #[serde(default)]
    pub description: String,

    /// Absolute link to the event page. May be empty.
    #[serde(default)]
    pub url: String,
}

impl EventRecord {
    /// Creates a record with the given title and no other data.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start: None,
            end: None,
            location: String::new(),
            description: String::new(),
            url: String::new(),
        }
    }

    /// Builder method to set the start timestamp.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Builder method to set the end timestamp.
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns true if the record has a start timestamp.
    pub fn is_scheduled(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_start() -> DateTime<Utc> {
        "2024-03-15T10:00:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn record_builder() {
        let record = EventRecord::new("Jazz Night")
            .with_start(sample_start())
            .with_location("Blue Note, Springfield")
            .with_description("Live jazz")
            .with_url("https://example.com/jazz");

        assert_eq!(record.title, "Jazz Night");
        assert!(record.is_scheduled());
        assert_eq!(record.location, "Blue Note, Springfield");
        assert!(record.end.is_none());
    }

    #[test]
    fn record_without_start_is_unscheduled() {
        let record = EventRecord::new("TBA Meetup");
        assert!(!record.is_scheduled());
    }

    #[test]
    fn serde_roundtrip() {
        let record = EventRecord::new("Art Fair")
            .with_start(sample_start())
            .with_end(sample_start() + chrono::Duration::hours(2));

        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: EventRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, parsed);
    }
}
