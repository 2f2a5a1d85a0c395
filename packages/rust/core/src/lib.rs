//! Load-and-merge pipeline for conference recordings.
//!
//! This crate ties the schedule mapper and the media matcher together:
//! - [`fetch`]: bounded retrieval of schedules and media listings
//! - [`loader`]: the per-event fetch → map → match → attach sequence
//! - [`catalog`]: memoized, concurrent loading and read-only views

pub mod catalog;
pub mod fetch;
pub mod loader;

pub use catalog::{Catalog, Event, EventFailure, LoadReport, LoadState, TalkListing};
pub use fetch::Fetcher;
pub use loader::{LoadedEvent, MediaOutcome, MediaStats, attach_media, load_event};
