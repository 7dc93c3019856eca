//! Filter engine, grouping, and aggregation orchestration for EventHarvest.
//!
//! This crate ties sources, filtering, and calendar encoding together into
//! the end-to-end aggregation run, behind the [`WriteSink`] and
//! [`ProgressReporter`] collaborator traits.

pub mod aggregator;
pub mod filter;
pub mod group;

pub use aggregator::{FsSink, ProgressReporter, RunResult, SilentProgress, WriteSink, run};
pub use filter::apply;
pub use group::{group_by_location, group_by_month, location_key, sanitize_location_token};
