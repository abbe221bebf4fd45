//! Errors raised by profile helpers.

use thiserror::Error;

/// Failures outside the per-field submission path.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The customer record could not be decoded.
    #[error("customer record is malformed")]
    InvalidRecord {
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The bank-account editor has no field with this name.
    #[error("unknown bank-account field")]
    UnknownField {
        /// Requested field name.
        field: String,
    },
}

/// Result alias for profile helpers.
pub type ProfileResult<T> = Result<T, ProfileError>;
