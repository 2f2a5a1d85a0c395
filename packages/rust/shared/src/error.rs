//! Error types for Recordings.
//!
//! Library crates use [`RecordingsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for all Recordings operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordingsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a schedule or media listing.
    #[error("network error: {0}")]
    Network(String),

    /// A fetch did not complete within the configured bound.
    #[error("timed out after {}s fetching {locator}", .after.as_secs())]
    Timeout { locator: String, after: Duration },

    /// Schedule XML could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filename pattern is not a usable two-group regex.
    #[error("invalid filename pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad locator, unusable input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A background load task panicked or was cancelled.
    #[error("load task failed: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RecordingsError>;

impl RecordingsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a pattern error for the given pattern source.
    pub fn pattern(pattern: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from retrieving a resource (network, timeout, local read).
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. } | Self::Io { .. })
    }
}
