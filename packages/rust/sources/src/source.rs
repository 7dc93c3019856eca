//! The polymorphic event-source abstraction.
//!
//! A [`Source`] fetches one remote page and normalizes whatever it finds
//! into [`EventRecord`]s. The set of variants is closed — selector-based
//! HTML extraction and schema.org JSON-LD extraction — so it is expressed
//! as a tagged enum rather than an open trait hierarchy.
//!
//! The fetch contract never fails: whole-source failures (network, HTTP
//! status, client errors) are converted to a warning plus an empty list at
//! this boundary, and per-element problems skip just that element. Nothing
//! from inside a source propagates to the aggregator.

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use eventharvest_shared::{EventRecord, Result, SourceConfig};

use crate::fetch::fetch_html;
use crate::html::HtmlSource;
use crate::schema_org::SchemaOrgSource;

// ---------------------------------------------------------------------------
// Per-element outcomes
// ---------------------------------------------------------------------------

/// Outcome of examining one candidate element or structured-data block.
///
/// Skips are explicit so they can be surfaced as diagnostics at the source
/// boundary instead of disappearing silently.
#[derive(Debug, Clone)]
pub(crate) enum Extraction {
    /// A complete, normalized record.
    Event(EventRecord),
    /// The element was not usable.
    Skip(SkipReason),
}

/// Why a candidate element was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    /// No title could be extracted.
    MissingTitle,
    /// No parsable date could be extracted (HTML sources require one).
    MissingDate,
    /// A structured-data block did not decode as JSON.
    MalformedJson,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingTitle => "missing title",
            Self::MissingDate => "missing or unparsable date",
            Self::MalformedJson => "malformed JSON-LD block",
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A configured event source. The closed set of extraction strategies.
#[derive(Debug)]
pub enum Source {
    /// Selector-based extraction from arbitrary HTML listings.
    Html(HtmlSource),
    /// schema.org Event blocks embedded as JSON-LD.
    SchemaOrg(SchemaOrgSource),
}

impl Source {
    /// Short kind name for logs and the `sources` listing.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Html(_) => "html",
            Self::SchemaOrg(_) => "schema",
        }
    }

    /// The page URL this source fetches.
    pub fn url(&self) -> &Url {
        match self {
            Self::Html(s) => s.url(),
            Self::SchemaOrg(s) => s.url(),
        }
    }

    /// Fetch and normalize events from this source.
    ///
    /// Never fails: any fetch or page-level parse problem is logged as a
    /// warning and yields an empty list, so a dead source contributes zero
    /// events without aborting the run.
    pub async fn fetch_events(&self, client: &Client) -> Vec<EventRecord> {
        match self.try_fetch(client).await {
            Ok(events) => events,
            Err(e) => {
                warn!(
                    source = self.kind(),
                    url = %self.url(),
                    error = %e,
                    "source fetch failed, contributing no events"
                );
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, client: &Client) -> Result<Vec<EventRecord>> {
        let body = fetch_html(client, self.url()).await?;

        let outcomes = match self {
            Self::Html(s) => s.extract_events(&body),
            Self::SchemaOrg(s) => s.extract_events(&body),
        };

        let mut events = Vec::new();
        let mut skipped = 0usize;
        for outcome in outcomes {
            match outcome {
                Extraction::Event(event) => events.push(event),
                Extraction::Skip(reason) => {
                    skipped += 1;
                    debug!(
                        source = self.kind(),
                        url = %self.url(),
                        reason = reason.as_str(),
                        "skipped element"
                    );
                }
            }
        }

        info!(
            source = self.kind(),
            url = %self.url(),
            events = events.len(),
            skipped,
            "source fetched"
        );

        Ok(events)
    }
}

// ---------------------------------------------------------------------------
// Construction from config
// ---------------------------------------------------------------------------

/// Build sources from the `[[sources]]` config entries, preserving order.
///
/// Disabled entries are skipped quietly; entries with a missing/invalid URL,
/// an invalid selector, or an unknown type are skipped with a warning. A bad
/// entry never prevents the remaining sources from being built.
pub fn sources_from_config(configs: &[SourceConfig]) -> Vec<Source> {
    let mut sources = Vec::new();

    for cfg in configs {
        if !cfg.enabled {
            debug!(url = %cfg.url, "source disabled, skipping");
            continue;
        }

        if cfg.url.trim().is_empty() {
            warn!("source entry with no url, skipping");
            continue;
        }

        let url = match Url::parse(&cfg.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %cfg.url, error = %e, "invalid source url, skipping");
                continue;
            }
        };

        match cfg.source_type.as_str() {
            "html" => {
                let selectors = cfg.selectors.clone().unwrap_or_default();
                match HtmlSource::new(url, &selectors) {
                    Ok(source) => sources.push(Source::Html(source)),
                    Err(e) => {
                        warn!(url = %cfg.url, error = %e, "could not build html source, skipping");
                    }
                }
            }
            "schema" => sources.push(Source::SchemaOrg(SchemaOrgSource::new(url))),
            other => {
                warn!(url = %cfg.url, source_type = other, "unknown source type, skipping");
            }
        }
    }

    sources
}
