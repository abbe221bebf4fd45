//! Error types for settings parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Field is not recognised.
    #[error("unknown configuration field")]
    UnknownField {
        /// Name of the unexpected field.
        field: String,
    },
    /// Top-level document was not a JSON object.
    #[error("configuration document must be an object")]
    NotAnObject,
    /// Document could not be parsed as JSON.
    #[error("configuration document is not valid json")]
    Parse {
        /// Source path when loaded from disk.
        path: Option<PathBuf>,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason,
            value,
        }
    }
}

/// Convenience alias for settings results.
pub type ConfigResult<T> = Result<T, ConfigError>;
