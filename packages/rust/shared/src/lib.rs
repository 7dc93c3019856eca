//! Shared types, error model, and configuration for EventHarvest.
//!
//! This crate is the foundation depended on by all other EventHarvest crates.
//! It provides:
//! - [`EventHarvestError`] — the unified error type
//! - Domain types ([`EventRecord`])
//! - Configuration ([`AppConfig`], [`FilterConfig`], config loading)
//! - Best-effort date parsing ([`dates::parse_fuzzy`])

pub mod config;
pub mod dates;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DateRangeConfig, FilterConfig, OutputsConfig, SelectorConfig, SourceConfig,
    TermFilterConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{EventHarvestError, Result};
pub use types::{EventRecord, UNKNOWN_LOCATION};
