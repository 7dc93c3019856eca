//! Application configuration for EventHarvest.
//!
//! User config lives at `./eventharvest.toml` or
//! `~/.eventharvest/eventharvest.toml`; an explicit `--config` path
//! overrides both. A missing config file degrades to documented defaults
//! (single main calendar, no filters, no sources).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EventHarvestError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "eventharvest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".eventharvest";

// ---------------------------------------------------------------------------
// Config structs (matching eventharvest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name for the main calendar.
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Filter sections, each independently toggleable.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Which calendar files to emit.
    #[serde(default)]
    pub outputs: OutputsConfig,

    /// Configured event sources, fetched in order.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            calendar_name: default_calendar_name(),
            filters: FilterConfig::default(),
            outputs: OutputsConfig::default(),
            sources: Vec::new(),
        }
    }
}

fn default_calendar_name() -> String {
    "My Events".into()
}

/// `[filters]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Location include/exclude terms.
    #[serde(default)]
    pub locations: TermFilterConfig,

    /// Keyword include/exclude terms, matched against title + description.
    #[serde(default)]
    pub keywords: TermFilterConfig,

    /// Start-timestamp date range.
    #[serde(default)]
    pub date_range: DateRangeConfig,
}

/// A single include/exclude term filter (`[filters.locations]`,
/// `[filters.keywords]`). Disabled by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermFilterConfig {
    /// Whether this filter stage runs at all.
    #[serde(default)]
    pub enabled: bool,

    /// Keep only records matching at least one term (empty = keep all).
    #[serde(default)]
    pub include: Vec<String>,

    /// Drop records matching any term. Exclusion wins over inclusion.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[filters.date_range]` section. Bounds are free-text date strings;
/// an unparsable bound degrades to "no bound".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRangeConfig {
    /// Whether the date-range stage runs at all.
    #[serde(default)]
    pub enabled: bool,

    /// Inclusive lower bound on the start timestamp.
    #[serde(default)]
    pub start_date: String,

    /// Inclusive upper bound on the start timestamp.
    #[serde(default)]
    pub end_date: String,
}

/// `[outputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    /// Filename of the main (all-events) calendar.
    #[serde(default = "default_main_calendar")]
    pub main_calendar: String,

    /// Additionally emit one calendar per location group.
    #[serde(default)]
    pub by_location: bool,

    /// Additionally emit one calendar per `YYYY-MM` month group.
    #[serde(default)]
    pub by_month: bool,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            main_calendar: default_main_calendar(),
            by_location: false,
            by_month: false,
        }
    }
}

fn default_main_calendar() -> String {
    "events.ics".into()
}

/// `[[sources]]` entry — one remote event listing to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind: "html" (CSS selectors) or "schema" (schema.org JSON-LD).
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,

    /// Page URL to fetch.
    #[serde(default)]
    pub url: String,

    /// Disabled sources are skipped without being constructed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// CSS selectors, used by "html" sources only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<SelectorConfig>,
}

fn default_source_type() -> String {
    "schema".into()
}

fn default_true() -> bool {
    true
}

/// `[sources.selectors]` — named CSS selectors for an "html" source.
/// A missing sub-selector extracts the empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector enumerating the per-event container elements.
    #[serde(default = "default_container")]
    pub container: String,

    /// Title sub-selector, relative to the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Date sub-selector; the matched text is fuzzy-parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Location sub-selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Description sub-selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Link sub-selector; the element's `href` is resolved against the
    /// source's base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            title: None,
            date: None,
            location: None,
            description: None,
            url: None,
        }
    }
}

fn default_container() -> String {
    ".event".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.eventharvest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EventHarvestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the home config file (`~/.eventharvest/eventharvest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// Resolution order: the explicit path if given (missing file is an error),
/// then `./eventharvest.toml`, then the home config file. When no file is
/// found, returns defaults — the caller will find zero sources configured
/// and report that instead of doing work.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    let home = config_file_path()?;
    if home.exists() {
        return load_config_from(&home);
    }

    tracing::warn!("no config file found, using defaults");
    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EventHarvestError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        EventHarvestError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EventHarvestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EventHarvestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EventHarvestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
