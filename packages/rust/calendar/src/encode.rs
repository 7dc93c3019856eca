//! iCalendar document encoding.
//!
//! Pure function over a record list: same records + same calendar name ⇒
//! byte-identical output, except for the DTSTAMP creation timestamps.
//! Records without a start timestamp are omitted, never an error.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike, Property};
use sha2::{Digest, Sha256};

use eventharvest_shared::EventRecord;

/// Product identifier emitted on every generated calendar.
pub const PRODID: &str = "-//EventHarvest//eventharvest//EN";

/// UID domain suffix; paired with a content hash it keeps UIDs stable for
/// identical (title, start) pairs across runs and processes.
const UID_DOMAIN: &str = "eventharvest";

/// Encode records as an iCalendar document with the given display name.
pub fn encode(records: &[EventRecord], calendar_name: &str) -> String {
    let mut calendar = Calendar::new();
    calendar.append_property(Property::new("PRODID", PRODID));
    calendar.name(calendar_name);
    calendar.append_property(Property::new("X-WR-TIMEZONE", "UTC"));

    for record in records {
        // Unscheduled records cannot be placed on a calendar.
        let Some(start) = record.start else { continue };

        let mut event = Event::new();

        let title = record.title.trim();
        event.summary(if title.is_empty() {
            "Untitled Event"
        } else {
            title
        });

        event.starts(start);
        if let Some(end) = record.end {
            event.ends(end);
        }
        if !record.location.is_empty() {
            event.location(&record.location);
        }
        if !record.description.is_empty() {
            event.description(&record.description);
        }
        if !record.url.is_empty() {
            event.add_property("URL", &record.url);
        }

        event.uid(&event_uid(&record.title, start));
        event.timestamp(Utc::now());

        calendar.push(event);
    }

    calendar.to_string()
}

/// Stable per-event identifier: SHA-256 over the UTF-8 title and the
/// RFC 3339 start, with a fixed domain suffix. A content hash (rather than
/// a process-seeded hash) makes re-runs against unchanged sources produce
/// the same UIDs.
pub fn event_uid(title: &str, start: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(start.to_rfc3339().as_bytes());
    format!("{:x}@{UID_DOMAIN}", hasher.finalize())
}
