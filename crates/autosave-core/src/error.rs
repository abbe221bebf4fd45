//! # Design
//!
//! - Constant-message errors; context travels in fields, never in the message.
//! - Collaborator failures ([`GatewayError`]) are converted into field state by
//!   the coordinator and never escape a submission.

use thiserror::Error;

use crate::descriptor::OptionKind;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The server processed the request and refused it.
    #[error("request rejected by server")]
    Rejected {
        /// Server-supplied, user-facing explanation.
        message: String,
    },
    /// The request could not be delivered or answered.
    #[error("collaborator unavailable")]
    Unavailable {
        /// Operation that failed.
        operation: &'static str,
        /// Diagnostic detail for logs.
        detail: String,
    },
}

impl GatewayError {
    /// Message suitable for showing inline, when the server supplied one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Errors returned by session operations invoked by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The form declares no field with this name.
    #[error("unknown field")]
    UnknownField {
        /// Form identifier.
        form: &'static str,
        /// Requested field name.
        field: String,
    },
    /// The field does not accept user edits.
    #[error("field is read-only")]
    ReadOnlyField {
        /// Form identifier.
        form: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// The session was closed.
    #[error("form session closed")]
    Closed {
        /// Form identifier.
        form: &'static str,
    },
}

/// Baseline or option-list load failures, surfaced at the form level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The server baseline could not be loaded.
    #[error("baseline load failed")]
    Baseline {
        /// Form identifier.
        form: &'static str,
        /// Collaborator failure.
        #[source]
        source: GatewayError,
    },
    /// An option list could not be loaded.
    #[error("option list load failed")]
    Options {
        /// List that failed.
        kind: OptionKind,
        /// Collaborator failure.
        #[source]
        source: GatewayError,
    },
}

impl LoadError {
    /// Text shown at the form level.
    #[must_use]
    pub fn display_message(&self) -> String {
        let source = match self {
            Self::Baseline { source, .. } | Self::Options { source, .. } => source,
        };
        source
            .server_message()
            .map_or_else(|| self.to_string(), ToString::to_string)
    }
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_ignores_blank_and_transport_errors() {
        let rejected = GatewayError::Rejected {
            message: "Email sudah terdaftar".into(),
        };
        assert_eq!(rejected.server_message(), Some("Email sudah terdaftar"));

        let blank = GatewayError::Rejected {
            message: "  ".into(),
        };
        assert_eq!(blank.server_message(), None);

        let offline = GatewayError::Unavailable {
            operation: "submit_single_field",
            detail: "connection reset".into(),
        };
        assert_eq!(offline.server_message(), None);
        assert_eq!(offline.to_string(), "collaborator unavailable");
    }

    #[test]
    fn load_error_prefers_server_text() {
        let err = LoadError::Options {
            kind: OptionKind::new("city"),
            source: GatewayError::Unavailable {
                operation: "fetch_option_list",
                detail: "timeout".into(),
            },
        };
        assert_eq!(err.display_message(), "option list load failed");
    }
}
