//! Mutable per-field state.

use crate::value::RawValue;

/// Submission lifecycle of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Rules are being evaluated.
    Validating,
    /// A submission is in flight.
    Submitting,
    /// The last submission was accepted.
    Succeeded,
    /// The last submission was rejected or could not be delivered.
    Failed,
}

/// State of one field within a form session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldState {
    /// Current, possibly unconfirmed value.
    pub value: RawValue,
    /// Last value persisted or loaded from the server.
    pub committed: RawValue,
    /// Inline error message.
    pub error: Option<String>,
    /// Submission lifecycle.
    pub status: FieldStatus,
    /// Transient "saved" signal, cleared after the display window.
    pub saved: bool,
    /// Field no longer accepts edits.
    pub locked: bool,
}

impl FieldState {
    /// Fresh state seeded from a baseline value.
    #[must_use]
    pub fn seeded(value: RawValue) -> Self {
        Self {
            committed: value.clone(),
            value,
            ..Self::default()
        }
    }

    /// `true` while a spinner should be shown.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, FieldStatus::Validating | FieldStatus::Submitting)
    }
}
