//! Baseline values used when a source leaves a setting unspecified.

use std::time::Duration;

/// Quiet period before a keystroke-triggered field is submitted.
pub const DEBOUNCE: Duration = Duration::from_millis(300);
/// How long the "saved" signal stays on a field after a successful submission.
pub const SUCCESS_DISPLAY: Duration = Duration::from_millis(2_000);
/// Upload ceiling for document fields (2 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;
/// Capacity of each session's event bus and replay ring.
pub const EVENT_BUFFER: usize = 256;

/// Upper bound accepted for the debounce window, in milliseconds.
pub(crate) const DEBOUNCE_MAX_MS: u64 = 10_000;
/// Upper bound accepted for the success display window, in milliseconds.
pub(crate) const SUCCESS_DISPLAY_MAX_MS: u64 = 60_000;
/// Upper bound accepted for the event buffer.
pub(crate) const EVENT_BUFFER_MAX: u64 = 65_536;
