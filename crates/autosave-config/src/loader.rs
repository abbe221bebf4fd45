//! Settings sources: JSON documents, files on disk, and process environment.
//!
//! Every source starts from [`AutosaveConfig::default`] and overrides only the
//! keys it carries, so partial documents are valid.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::defaults::{DEBOUNCE_MAX_MS, EVENT_BUFFER_MAX, SUCCESS_DISPLAY_MAX_MS};
use crate::error::{ConfigError, ConfigResult};
use crate::model::AutosaveConfig;
use crate::validate::{millis, parse_bounded, parse_bounded_str, to_usize};

/// Environment variable carrying the debounce window in milliseconds.
pub const ENV_DEBOUNCE_MS: &str = "AUTOSAVE_DEBOUNCE_MS";
/// Environment variable carrying the success display window in milliseconds.
pub const ENV_SUCCESS_DISPLAY_MS: &str = "AUTOSAVE_SUCCESS_DISPLAY_MS";
/// Environment variable carrying the upload ceiling in bytes.
pub const ENV_MAX_UPLOAD_BYTES: &str = "AUTOSAVE_MAX_UPLOAD_BYTES";
/// Environment variable carrying the event bus capacity.
pub const ENV_EVENT_BUFFER: &str = "AUTOSAVE_EVENT_BUFFER";

#[derive(Clone, Copy)]
enum Setting {
    DebounceMs,
    SuccessDisplayMs,
    MaxUploadBytes,
    EventBuffer,
}

impl Setting {
    const fn key(self) -> &'static str {
        match self {
            Self::DebounceMs => "debounce_ms",
            Self::SuccessDisplayMs => "success_display_ms",
            Self::MaxUploadBytes => "max_upload_bytes",
            Self::EventBuffer => "event_buffer",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "debounce_ms" => Some(Self::DebounceMs),
            "success_display_ms" => Some(Self::SuccessDisplayMs),
            "max_upload_bytes" => Some(Self::MaxUploadBytes),
            "event_buffer" => Some(Self::EventBuffer),
            _ => None,
        }
    }

    fn from_env(name: &str) -> Option<Self> {
        match name {
            ENV_DEBOUNCE_MS => Some(Self::DebounceMs),
            ENV_SUCCESS_DISPLAY_MS => Some(Self::SuccessDisplayMs),
            ENV_MAX_UPLOAD_BYTES => Some(Self::MaxUploadBytes),
            ENV_EVENT_BUFFER => Some(Self::EventBuffer),
            _ => None,
        }
    }

    const fn range(self) -> std::ops::RangeInclusive<u64> {
        match self {
            Self::DebounceMs => 0..=DEBOUNCE_MAX_MS,
            Self::SuccessDisplayMs => 1..=SUCCESS_DISPLAY_MAX_MS,
            Self::MaxUploadBytes => 1..=u64::MAX,
            Self::EventBuffer => 1..=EVENT_BUFFER_MAX,
        }
    }

    fn apply(self, config: &mut AutosaveConfig, value: u64) -> ConfigResult<()> {
        match self {
            Self::DebounceMs => config.debounce = millis(value),
            Self::SuccessDisplayMs => config.success_display = millis(value),
            Self::MaxUploadBytes => config.max_upload_bytes = value,
            Self::EventBuffer => config.event_buffer = to_usize(value, self.key())?,
        }
        Ok(())
    }
}

impl AutosaveConfig {
    /// Build settings from a (possibly partial) JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] for non-object documents,
    /// [`ConfigError::UnknownField`] for unrecognised keys, and
    /// [`ConfigError::InvalidField`] for values of the wrong type or range.
    pub fn from_json(document: &Value) -> ConfigResult<Self> {
        let map = document.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut config = Self::default();
        for (key, value) in map {
            let setting = Setting::from_key(key).ok_or_else(|| ConfigError::UnknownField {
                field: key.clone(),
            })?;
            let parsed = parse_bounded(value, setting.key(), setting.range())?;
            setting.apply(&mut config, parsed)?;
        }
        debug!(?config, "loaded autosave settings from json");
        Ok(config)
    }

    /// Read and parse a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] when it is not JSON, and any error from
    /// [`AutosaveConfig::from_json`].
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "read_settings",
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        Self::from_json(&document)
    }

    /// Build settings from `AUTOSAVE_*` variables in the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a recognised variable holds an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_map(std::env::vars())
    }

    /// Build settings from an arbitrary set of environment-style pairs.
    ///
    /// Variables outside the `AUTOSAVE_*` set are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a recognised variable holds an invalid value.
    pub fn from_env_map<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (name, raw) in vars {
            let Some(setting) = Setting::from_env(name.as_ref()) else {
                continue;
            };
            let parsed = parse_bounded_str(raw.as_ref(), name.as_ref(), setting.range())?;
            setting.apply(&mut config, parsed)?;
        }
        Ok(config)
    }
}
