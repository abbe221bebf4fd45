//! Raw field values as entered by the user or loaded from the server.
//!
//! Text compares by content; uploaded files compare by identity, so picking the
//! same file twice still counts as a change.

use std::fmt;
use std::sync::Arc;

/// Metadata and content of a file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original file name.
    pub name: String,
    /// MIME type reported by the picker.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Construct a file from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Shared handle to an uploaded file; equality is handle identity.
#[derive(Clone)]
pub struct FileHandle(Arc<UploadedFile>);

impl FileHandle {
    /// Wrap a freshly picked file.
    #[must_use]
    pub fn new(file: UploadedFile) -> Self {
        Self(Arc::new(file))
    }

    /// Borrow the file.
    #[must_use]
    pub fn file(&self) -> &UploadedFile {
        &self.0
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.0.name)
            .field("size", &self.0.size())
            .finish()
    }
}

/// Current or committed content of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawValue {
    /// Nothing entered or loaded.
    #[default]
    Empty,
    /// Textual input, including select and radio values.
    Text(String),
    /// A file picked for upload.
    File(FileHandle),
}

impl RawValue {
    /// Build a text value, mapping the empty string to [`RawValue::Empty`].
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// Build a file value.
    #[must_use]
    pub fn file(file: UploadedFile) -> Self {
        Self::File(FileHandle::new(file))
    }

    /// `true` when nothing was entered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// File handle, if this is a file value.
    #[must_use]
    pub const fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Self::File(handle) => Some(handle),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::text)
    }
}
