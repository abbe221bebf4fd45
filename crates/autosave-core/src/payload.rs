//! Multipart-style single-field submission payloads.

use crate::value::FileHandle;

/// Value carried by one payload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    /// Text part.
    Text(String),
    /// File part.
    File(FileHandle),
}

/// A single `key=value` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    /// Key the server expects.
    pub key: &'static str,
    /// Encoded value.
    pub value: PayloadValue,
}

/// Partial update sent for one field (plus its companions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    /// Form the field belongs to.
    pub form: &'static str,
    /// Field that triggered the submission.
    pub field: &'static str,
    /// Encoded parts, primary field first.
    pub parts: Vec<PayloadPart>,
}

impl SubmissionPayload {
    /// Text value for `key`, if present.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            PayloadValue::Text(text) if part.key == key => Some(text.as_str()),
            _ => None,
        })
    }

    /// File value for `key`, if present.
    #[must_use]
    pub fn file(&self, key: &str) -> Option<&FileHandle> {
        self.parts.iter().find_map(|part| match &part.value {
            PayloadValue::File(handle) if part.key == key => Some(handle),
            _ => None,
        })
    }

    /// Keys in submission order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.parts.iter().map(|part| part.key).collect()
    }
}
