//! Event sources: fetching remote pages and normalizing them to records.
//!
//! This crate provides:
//! - [`Source`] — the closed polymorphic source set (HTML selectors,
//!   schema.org JSON-LD), with a never-failing fetch boundary
//! - [`sources_from_config`] — construction from `[[sources]]` config
//! - [`fetch`] — the shared HTTP client (timeout, User-Agent)

pub mod fetch;
pub mod html;
pub mod schema_org;
pub mod source;

pub use fetch::{FETCH_TIMEOUT, USER_AGENT, build_client, fetch_html};
pub use html::HtmlSource;
pub use schema_org::SchemaOrgSource;
pub use source::{Source, sources_from_config};
