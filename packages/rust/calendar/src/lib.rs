//! iCalendar encoding for EventHarvest.
//!
//! This crate provides:
//! - [`encode`] — deterministic records → iCalendar document serialization
//! - [`event_uid`] — stable content-hash event identifiers

pub mod encode;

pub use encode::{PRODID, encode, event_uid};
