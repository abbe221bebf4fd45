//! Typed engine settings.
//!
//! # Design
//! - Plain data carrier shared by every form session.
//! - Parsing and range checks live in `validate.rs`/`loader.rs`.

use std::time::Duration;

use crate::defaults;

/// Settings consumed by the autosave engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period before keystroke-triggered fields submit.
    pub debounce: Duration,
    /// Display window for the transient "saved" signal.
    pub success_display: Duration,
    /// Upload ceiling for file fields, in bytes.
    pub max_upload_bytes: u64,
    /// Capacity of the per-session event bus.
    pub event_buffer: usize,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: defaults::DEBOUNCE,
            success_display: defaults::SUCCESS_DISPLAY,
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            event_buffer: defaults::EVENT_BUFFER,
        }
    }
}

impl AutosaveConfig {
    /// Override the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Override the success display window.
    #[must_use]
    pub const fn with_success_display(mut self, window: Duration) -> Self {
        self.success_display = window;
        self
    }

    /// Override the upload ceiling.
    #[must_use]
    pub const fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AutosaveConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.success_display, Duration::from_secs(2));
        assert_eq!(config.max_upload_bytes, 2_097_152);
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = AutosaveConfig::default()
            .with_debounce(Duration::from_millis(50))
            .with_max_upload_bytes(10);
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.max_upload_bytes, 10);
        assert_eq!(config.success_display, defaults::SUCCESS_DISPLAY);
    }
}
