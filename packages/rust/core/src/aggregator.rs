//! End-to-end aggregation run: fetch each source → filter → group → encode
//! → hand every calendar to the write-sink.
//!
//! The aggregator is strictly sequential and holds no state between runs.
//! It never touches storage itself; encoded calendars go to a [`WriteSink`]
//! collaborator by filename, and human-facing progress goes to a
//! [`ProgressReporter`].

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use eventharvest_calendar as calendar;
use eventharvest_shared::{AppConfig, EventHarvestError, Result};
use eventharvest_sources::{Source, build_client};

use crate::{filter, group};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Named byte sink for finished calendars. Overwrite semantics — no append,
/// no versioning.
pub trait WriteSink: Send + Sync {
    /// Write one finished calendar under the given filename.
    fn write(&self, filename: &str, content: &[u8]) -> Result<()>;
}

/// Writes calendars as files under a root directory.
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WriteSink for FsSink {
    fn write(&self, filename: &str, content: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| EventHarvestError::io(&self.root, e))?;

        let path = self.root.join(filename);
        std::fs::write(&path, content).map_err(|e| EventHarvestError::io(&path, e))
    }
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each source has been fetched.
    fn source_fetched(&self, kind: &str, url: &str, events: usize, current: usize, total: usize);
    /// Called after each calendar has been written.
    fn calendar_written(&self, filename: &str, events: usize);
    /// Called when the run completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_fetched(&self, _kind: &str, _url: &str, _events: usize, _cur: usize, _total: usize) {}
    fn calendar_written(&self, _filename: &str, _events: usize) {}
    fn done(&self, _result: &RunResult) {}
}

// ---------------------------------------------------------------------------
// Run result
// ---------------------------------------------------------------------------

/// Summary of a completed aggregation run.
#[derive(Debug)]
pub struct RunResult {
    /// Records collected across all sources, before filtering.
    pub events_collected: usize,
    /// Records surviving the filter stages.
    pub events_kept: usize,
    /// Calendars written: (filename, record count).
    pub calendars: Vec<(String, usize)>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

// ---------------------------------------------------------------------------
// The run
// ---------------------------------------------------------------------------

/// Run the full aggregation pipeline.
///
/// Source failures were already reduced to empty lists inside the sources,
/// so the fetch loop itself cannot fail; the error paths here are "no
/// sources configured" (terminal, surfaced gently by the caller) and
/// write-sink failures (not ours to recover).
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn run(
    config: &AppConfig,
    sources: &[Source],
    sink: &dyn WriteSink,
    progress: &dyn ProgressReporter,
) -> Result<RunResult> {
    if sources.is_empty() {
        return Err(EventHarvestError::validation("no sources configured"));
    }

    let started = Instant::now();
    let client = build_client()?;

    // --- Phase 1: Fetch ---
    progress.phase("Fetching sources");
    let total = sources.len();
    let mut collected = Vec::new();

    for (i, source) in sources.iter().enumerate() {
        let events = source.fetch_events(&client).await;
        progress.source_fetched(source.kind(), source.url().as_str(), events.len(), i + 1, total);
        collected.extend(events);
    }

    let events_collected = collected.len();
    info!(events = events_collected, "all sources fetched");

    // --- Phase 2: Filter ---
    progress.phase("Applying filters");
    let kept = filter::apply(collected, &config.filters);
    let events_kept = kept.len();
    if events_kept != events_collected {
        info!(
            dropped = events_collected - events_kept,
            kept = events_kept,
            "filters dropped events"
        );
    }

    // --- Phase 3: Encode & write ---
    progress.phase("Writing calendars");
    let mut calendars: Vec<(String, usize)> = Vec::new();

    let main_ics = calendar::encode(&kept, &config.calendar_name);
    sink.write(&config.outputs.main_calendar, main_ics.as_bytes())?;
    progress.calendar_written(&config.outputs.main_calendar, events_kept);
    calendars.push((config.outputs.main_calendar.clone(), events_kept));

    if config.outputs.by_location {
        for (key, records) in group::group_by_location(&kept) {
            let filename = format!("events_{}.ics", group::sanitize_location_token(&key));
            let ics = calendar::encode(&records, &format!("Events - {key}"));
            sink.write(&filename, ics.as_bytes())?;
            progress.calendar_written(&filename, records.len());
            calendars.push((filename, records.len()));
        }
    }

    if config.outputs.by_month {
        for (key, records) in group::group_by_month(&kept) {
            let filename = format!("events_{key}.ics");
            let ics = calendar::encode(&records, &format!("Events - {key}"));
            sink.write(&filename, ics.as_bytes())?;
            progress.calendar_written(&filename, records.len());
            calendars.push((filename, records.len()));
        }
    }

    let result = RunResult {
        events_collected,
        events_kept,
        calendars,
        elapsed: started.elapsed(),
    };

    progress.done(&result);

    info!(
        collected = result.events_collected,
        kept = result.events_kept,
        calendars = result.calendars.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "aggregation run complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use eventharvest_shared::{OutputsConfig, SourceConfig, TermFilterConfig};
    use eventharvest_sources::sources_from_config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory sink capturing written calendars by filename.
    #[derive(Default)]
    struct MemorySink {
        files: Mutex<HashMap<String, String>>,
    }

    impl MemorySink {
        fn get(&self, filename: &str) -> Option<String> {
            self.files.lock().unwrap().get(filename).cloned()
        }

        fn filenames(&self) -> Vec<String> {
            let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl WriteSink for MemorySink {
        fn write(&self, filename: &str, content: &[u8]) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(filename.to_string(), String::from_utf8_lossy(content).into());
            Ok(())
        }
    }

    fn schema_body() -> &'static str {
        r#"<html><head><script type="application/ld+json">
        [
            {"@type": "Event", "name": "Jazz Night",
             "startDate": "2024-03-15T19:30:00Z",
             "location": {"@type": "Place",
                          "address": {"streetAddress": "123 Main St",
                                      "addressLocality": "Springfield"}}},
            {"@type": "Event", "name": "Python Workshop",
             "startDate": "2024-03-16T10:00:00Z",
             "location": "Shelbyville"},
            {"@type": "Event", "name": "April Gala",
             "startDate": "2024-04-02T18:00:00Z",
             "location": "Springfield"}
        ]
        </script></head></html>"#
    }

    async fn mock_schema_source(server: &MockServer) -> Vec<Source> {
        Mock::given(method("GET"))
            .and(path("/whatson"))
            .respond_with(ResponseTemplate::new(200).set_body_string(schema_body()))
            .mount(server)
            .await;

        sources_from_config(&[SourceConfig {
            source_type: "schema".into(),
            url: format!("{}/whatson", server.uri()),
            enabled: true,
            selectors: None,
        }])
    }

    #[tokio::test]
    async fn no_sources_is_a_terminal_validation_error() {
        let sink = MemorySink::default();
        let result = run(&AppConfig::default(), &[], &sink, &SilentProgress).await;

        match result {
            Err(EventHarvestError::Validation { message }) => {
                assert!(message.contains("no sources"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(sink.filenames().is_empty());
    }

    #[tokio::test]
    async fn writes_main_calendar_with_filtered_events() {
        let server = MockServer::start().await;
        let sources = mock_schema_source(&server).await;
        let sink = MemorySink::default();

        let mut config = AppConfig::default();
        config.calendar_name = "City Events".into();
        config.filters.keywords = TermFilterConfig {
            enabled: true,
            include: vec![],
            exclude: vec!["workshop".into()],
        };

        let result = run(&config, &sources, &sink, &SilentProgress)
            .await
            .expect("run succeeds");

        assert_eq!(result.events_collected, 3);
        assert_eq!(result.events_kept, 2);
        assert_eq!(sink.filenames(), vec!["events.ics"]);

        let main = sink.get("events.ics").expect("main calendar written");
        assert!(main.contains("X-WR-CALNAME:City Events"));
        assert!(main.contains("SUMMARY:Jazz Night"));
        assert!(main.contains("SUMMARY:April Gala"));
        assert!(!main.contains("Python Workshop"));
    }

    #[tokio::test]
    async fn writes_location_and_month_calendars() {
        let server = MockServer::start().await;
        let sources = mock_schema_source(&server).await;
        let sink = MemorySink::default();

        let mut config = AppConfig::default();
        config.outputs = OutputsConfig {
            main_calendar: "events.ics".into(),
            by_location: true,
            by_month: true,
        };

        let result = run(&config, &sources, &sink, &SilentProgress)
            .await
            .expect("run succeeds");

        assert_eq!(result.events_collected, 3);
        assert_eq!(
            sink.filenames(),
            vec![
                "events.ics",
                "events_2024-03.ics",
                "events_2024-04.ics",
                "events_Shelbyville.ics",
                "events_Springfield.ics",
            ]
        );

        // "123 Main St, Springfield" groups under the trailing city segment.
        let springfield = sink.get("events_Springfield.ics").unwrap();
        assert!(springfield.contains("SUMMARY:Jazz Night"));
        assert!(springfield.contains("SUMMARY:April Gala"));
        assert!(springfield.contains("X-WR-CALNAME:Events - Springfield"));

        let march = sink.get("events_2024-03.ics").unwrap();
        assert!(march.contains("SUMMARY:Jazz Night"));
        assert!(march.contains("SUMMARY:Python Workshop"));
        assert!(!march.contains("April Gala"));
    }

    #[tokio::test]
    async fn failed_source_contributes_zero_events() {
        let server = MockServer::start().await;
        let mut sources = mock_schema_source(&server).await;

        // A second source that always 404s.
        Mock::given(method("GET"))
            .and(path("/dead"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        sources.extend(sources_from_config(&[SourceConfig {
            source_type: "schema".into(),
            url: format!("{}/dead", server.uri()),
            enabled: true,
            selectors: None,
        }]));

        let sink = MemorySink::default();
        let result = run(&AppConfig::default(), &sources, &sink, &SilentProgress)
            .await
            .expect("run still succeeds");

        assert_eq!(result.events_collected, 3);
    }

    #[tokio::test]
    async fn fs_sink_writes_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = FsSink::new(dir.path().join("out"));

        sink.write("events.ics", b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n")
            .expect("write");

        let written = std::fs::read_to_string(dir.path().join("out/events.ics")).expect("read");
        assert!(written.starts_with("BEGIN:VCALENDAR"));

        // Overwrite semantics.
        sink.write("events.ics", b"second").expect("overwrite");
        let written = std::fs::read_to_string(dir.path().join("out/events.ics")).expect("read");
        assert_eq!(written, "second");
    }
}
