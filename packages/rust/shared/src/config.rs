//! Application configuration for Recordings.
//!
//! User config lives at `~/.recordings/recordings.toml`.
//! A `--config` flag on the CLI overrides the location; missing files fall
//! back to defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecordingsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "recordings.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".recordings";

// ---------------------------------------------------------------------------
// Config structs (matching recordings.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fetch behaviour shared by all events.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Conferences to aggregate, in display order.
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Upper bound for a single schedule or media-listing fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of events loaded at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_concurrency() -> u32 {
    4
}

/// `[[events]]` entry: one conference and where its data is published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Short name used in logs and listings. Falls back to the schedule locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Locator of the schedule XML (URL or local path).
    pub schedule: String,

    /// Locator of the media listing (URL or local path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_listing: Option<String>,

    /// Regex with two capture groups: filename, then talk id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_regex: Option<String>,

    /// Pre-seeded metadata. Conference fields read from the schedule overwrite same-named keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl EventConfig {
    /// Create an event descriptor for a schedule locator with no media listing.
    pub fn new(schedule: impl Into<String>) -> Self {
        Self {
            schedule: schedule.into(),
            ..Self::default()
        }
    }

    /// Attach a media listing and the pattern used to read it.
    pub fn with_media(mut self, listing: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.media_listing = Some(listing.into());
        self.filename_regex = Some(pattern.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for logs and listings.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.schedule)
    }

    /// The media listing and its pattern, only when both are configured.
    pub fn media_source(&self) -> Option<(&str, &str)> {
        match (&self.media_listing, &self.filename_regex) {
            (Some(listing), Some(pattern)) => Some((listing.as_str(), pattern.as_str())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.recordings/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RecordingsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.recordings/recordings.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RecordingsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        RecordingsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate(&config)?;

    tracing::debug!(?path, events = config.events.len(), "config loaded");
    Ok(config)
}

/// Reject settings no loader could work with.
fn validate(config: &AppConfig) -> Result<()> {
    if config.fetch.timeout_secs == 0 {
        return Err(RecordingsError::config("fetch.timeout_secs must be at least 1"));
    }
    if config.fetch.concurrency == 0 {
        return Err(RecordingsError::config("fetch.concurrency must be at least 1"));
    }
    if let Some(event) = config.events.iter().find(|e| e.schedule.trim().is_empty()) {
        return Err(RecordingsError::config(format!(
            "event '{}' has an empty schedule locator",
            event.label()
        )));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config(force: bool) -> Result<PathBuf> {
    init_config_at(&config_file_path()?, force)
}

/// Write a default config file at `path`, creating parent directories.
///
/// An existing file holds the user's event list and is only replaced when
/// `force` is set.
pub fn init_config_at(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(RecordingsError::config(format!(
            "{} already exists (use --force to replace it)",
            path.display()
        )));
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| RecordingsError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RecordingsError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| RecordingsError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs"));
        assert!(toml_str.contains("concurrency"));
    }

    #[test]
    fn config_with_events() {
        let toml_str = r##"
[fetch]
timeout_secs = 5

[[events]]
name = "camp2015"
schedule = "https://events.ccc.de/camp/2015/Fahrplan/schedule.xml"
media_listing = "https://cdn.media.ccc.de/events/camp2015/h264-hd/"
filename_regex = 'href="(camp2015-(\d+)-[^"]+\.mp4)"'

[events.metadata]
title = "placeholder"
hashtag = "#cccamp15"

[[events]]
schedule = "/srv/schedules/froscon.xml"
"##;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        validate(&config).expect("valid");

        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.events.len(), 2);

        let camp = &config.events[0];
        assert_eq!(camp.label(), "camp2015");
        assert!(camp.media_source().is_some());
        assert_eq!(camp.metadata.get("hashtag").map(String::as_str), Some("#cccamp15"));

        let froscon = &config.events[1];
        assert_eq!(froscon.label(), "/srv/schedules/froscon.xml");
        assert!(froscon.media_source().is_none());
    }

    #[test]
    fn media_source_needs_listing_and_pattern() {
        let mut event = EventConfig::new("https://example.com/schedule.xml");
        event.media_listing = Some("https://example.com/media/".into());
        assert!(event.media_source().is_none());

        let event = event.with_media("https://example.com/media/", r"(\S+) talk=(\d+)");
        assert_eq!(
            event.media_source(),
            Some(("https://example.com/media/", r"(\S+) talk=(\d+)"))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config: AppConfig = toml::from_str("[fetch]\ntimeout_secs = 0\n").expect("parse");
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn empty_schedule_locator_is_rejected() {
        let config: AppConfig =
            toml::from_str("[[events]]\nname = \"x\"\nschedule = \"  \"\n").expect("parse");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn init_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("recordings-config-{}", std::process::id()));
        let path = dir.join(CONFIG_FILE_NAME);

        let written = init_config_at(&path, false).expect("init");
        let loaded = load_config_from(&written).expect("load");
        assert_eq!(loaded.fetch.timeout_secs, 30);
        assert!(loaded.events.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_keeps_existing_file_unless_forced() {
        let dir = std::env::temp_dir().join(format!("recordings-force-{}", std::process::id()));
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(&path, "[[events]]\nschedule = \"/srv/schedule.xml\"\n").expect("write");

        let err = init_config_at(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(load_config_from(&path).expect("load").events.len(), 1);

        init_config_at(&path, true).expect("forced init");
        assert!(load_config_from(&path).expect("load").events.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
