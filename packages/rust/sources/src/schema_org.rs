//! schema.org structured-metadata extraction.
//!
//! Many event pages embed machine-readable Event descriptions as JSON-LD
//! (`<script type="application/ld+json">`). This source walks every such
//! block on the page, tolerating per-block decode failures, and maps
//! objects tagged `@type: "Event"` to records. Unlike the HTML source,
//! a record with an unparsable `startDate` is kept (start absent): the
//! pipeline filters it out of date-range filtering and encoding later.

use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use eventharvest_shared::{EventRecord, dates};

use crate::source::{Extraction, SkipReason};

/// A page scraped for embedded schema.org Event blocks.
#[derive(Debug)]
pub struct SchemaOrgSource {
    url: Url,
}

impl SchemaOrgSource {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// The page URL this source fetches.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Walk the JSON-LD blocks of a fetched page, one outcome per Event
    /// object plus one skip per undecodable block.
    pub(crate) fn extract_events(&self, body: &str) -> Vec<Extraction> {
        let doc = Html::parse_document(body);
        let script_sel =
            Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector");

        let mut outcomes = Vec::new();
        for script in doc.select(&script_sel) {
            let raw = script.text().collect::<String>();

            let value: Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(_) => {
                    outcomes.push(Extraction::Skip(SkipReason::MalformedJson));
                    continue;
                }
            };

            match value {
                Value::Array(items) => {
                    outcomes.extend(items.iter().filter(|i| is_event(i)).map(parse_event));
                }
                ref single if is_event(single) => outcomes.push(parse_event(single)),
                _ => {} // unrelated structured data (breadcrumbs, org info, …)
            }
        }

        outcomes
    }
}

/// Exact-match type check, as emitted by mainstream event pages.
fn is_event(value: &Value) -> bool {
    value.get("@type").and_then(Value::as_str) == Some("Event")
}

/// Map one schema.org Event object to a record.
fn parse_event(data: &Value) -> Extraction {
    let title = str_field(data, "name");
    if title.trim().is_empty() {
        return Extraction::Skip(SkipReason::MissingTitle);
    }

    let start = data
        .get("startDate")
        .and_then(Value::as_str)
        .and_then(dates::parse_fuzzy);
    let end = data
        .get("endDate")
        .and_then(Value::as_str)
        .and_then(dates::parse_fuzzy);

    Extraction::Event(EventRecord {
        title,
        start,
        end,
        location: extract_location(data.get("location")),
        description: str_field(data, "description"),
        url: str_field(data, "url"),
    })
}

fn str_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Normalize the polymorphic schema.org `location` value to a plain string:
/// the place's own name if present, else street + locality joined with ", ",
/// else whatever address value exists stringified, else empty.
fn extract_location(location: Option<&Value>) -> String {
    let Some(location) = location else {
        return String::new();
    };

    match location {
        Value::Object(place) => {
            if let Some(name) = place.get("name").and_then(Value::as_str)
                && !name.is_empty()
            {
                return name.to_string();
            }

            match place.get("address") {
                Some(Value::Object(address)) => {
                    let parts: Vec<&str> = ["streetAddress", "addressLocality"]
                        .iter()
                        .filter_map(|key| address.get(*key).and_then(Value::as_str))
                        .filter(|part| !part.is_empty())
                        .collect();
                    parts.join(", ")
                }
                Some(Value::String(address)) => address.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            }
        }
        Value::String(name) => name.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
