//! Shared types, error model, and configuration for Recordings.
//!
//! This crate is the foundation depended on by all other Recordings crates.
//! It provides:
//! - [`RecordingsError`]: the unified error type
//! - Domain types ([`ConferenceMetadata`], [`Talk`], [`Person`], [`TalkId`])
//! - Configuration ([`AppConfig`], [`EventConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EventConfig, FetchConfig, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from,
};
pub use error::{RecordingsError, Result};
pub use types::{ConferenceMetadata, Person, Talk, TalkId};
