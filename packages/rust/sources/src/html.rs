//! Selector-based extraction from arbitrary HTML event listings.
//!
//! Configured with a base URL and a set of named CSS selectors. Each
//! element matching the `container` selector is a candidate event; it
//! becomes a record only when both a title and a parsable date are found.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use eventharvest_shared::{EventHarvestError, EventRecord, Result, SelectorConfig, dates};

use crate::source::{Extraction, SkipReason};

/// An HTML listing page scraped with user-configured CSS selectors.
#[derive(Debug)]
pub struct HtmlSource {
    url: Url,
    container: Selector,
    title: Option<Selector>,
    date: Option<Selector>,
    location: Option<Selector>,
    description: Option<Selector>,
    link: Option<Selector>,
}

impl HtmlSource {
    /// Compile the configured selectors. An invalid selector string fails
    /// construction; the config layer skips such a source with a warning.
    pub fn new(url: Url, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            url,
            container: parse_selector(&selectors.container)?,
            title: compile_opt(selectors.title.as_deref())?,
            date: compile_opt(selectors.date.as_deref())?,
            location: compile_opt(selectors.location.as_deref())?,
            description: compile_opt(selectors.description.as_deref())?,
            link: compile_opt(selectors.url.as_deref())?,
        })
    }

    /// The page URL this source fetches.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Walk the container elements of a fetched page, one outcome each.
    pub(crate) fn extract_events(&self, body: &str) -> Vec<Extraction> {
        let doc = Html::parse_document(body);
        doc.select(&self.container)
            .map(|element| self.extract_event(element))
            .collect()
    }

    fn extract_event(&self, element: ElementRef<'_>) -> Extraction {
        let title = extract_text(element, self.title.as_ref());
        if title.is_empty() {
            return Extraction::Skip(SkipReason::MissingTitle);
        }

        let date_text = extract_text(element, self.date.as_ref());
        let Some(start) = dates::parse_fuzzy(&date_text) else {
            return Extraction::Skip(SkipReason::MissingDate);
        };

        let record = EventRecord::new(title)
            .with_start(start)
            .with_location(extract_text(element, self.location.as_ref()))
            .with_description(extract_text(element, self.description.as_ref()))
            .with_url(self.extract_link(element));

        Extraction::Event(record)
    }

    /// Extract an `href` via the link sub-selector, resolved against the
    /// source's base URL so relative links come out absolute.
    fn extract_link(&self, element: ElementRef<'_>) -> String {
        let Some(selector) = &self.link else {
            return String::new();
        };
        let Some(found) = element.select(selector).next() else {
            return String::new();
        };
        let Some(href) = found.value().attr("href") else {
            return String::new();
        };

        self.url
            .join(href)
            .map(|resolved| resolved.to_string())
            .unwrap_or_default()
    }
}

/// Extract trimmed text via a sub-selector; empty string when the selector
/// is absent or unmatched.
fn extract_text(element: ElementRef<'_>, selector: Option<&Selector>) -> String {
    selector
        .and_then(|sel| element.select(sel).next())
        .map(|found| found.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw)
        .map_err(|e| EventHarvestError::config(format!("invalid selector '{raw}': {e}")))
}

fn compile_opt(raw: Option<&str>) -> Result<Option<Selector>> {
    raw.map(parse_selector).transpose()
}
