//! Error types for embed-json.
//!
//! Library crates use [`EmbedJsonError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all embed-json operations.
///
/// Hosts categorize failures by message prefix ("invalid option",
/// "invalid source path"), so keep those stable.
#[derive(Debug, thiserror::Error)]
pub enum EmbedJsonError {
    /// A configuration field is missing, mistyped, or points nowhere.
    #[error("invalid option: {option} {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    /// A candidate's `src` is empty or does not resolve to a regular file.
    #[error("invalid source path: {src}")]
    InvalidSource { src: String },

    /// The referenced file is not valid JSON but minification was requested.
    #[error("failed to embed {src}: {source}")]
    EmbedFailure {
        src: String,
        source: serde_json::Error,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The host handed over a streaming file body.
    #[error("streams are not supported")]
    StreamsNotSupported,

    /// Config file loading error.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EmbedJsonError>;

impl EmbedJsonError {
    /// Create an invalid-option error for the named field.
    pub fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }

    /// Create an invalid-source error for a `src` attribute value.
    pub fn invalid_source(src: impl Into<String>) -> Self {
        Self::InvalidSource { src: src.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// Whether this error came from option validation.
    pub fn is_invalid_option(&self) -> bool {
        matches!(self, Self::InvalidOption { .. })
    }
}
