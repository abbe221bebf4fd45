//! Parsing helpers with range checks for individual settings.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Interpret a JSON value as a non-negative integer inside `range`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an unsigned
/// integer or falls outside the accepted range.
pub fn parse_bounded(value: &Value, field: &str, range: RangeInclusive<u64>) -> ConfigResult<u64> {
    let number = value.as_u64().ok_or_else(|| {
        ConfigError::invalid(
            field,
            "must be a non-negative integer",
            Some(value.to_string()),
        )
    })?;
    check_range(number, field, range)
}

/// Interpret a raw string (typically from the environment) as an integer inside `range`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the text is not an unsigned
/// integer or falls outside the accepted range.
pub fn parse_bounded_str(
    raw: &str,
    field: &str,
    range: RangeInclusive<u64>,
) -> ConfigResult<u64> {
    let number = raw.trim().parse::<u64>().map_err(|_| {
        ConfigError::invalid(
            field,
            "must be a non-negative integer",
            Some(raw.to_string()),
        )
    })?;
    check_range(number, field, range)
}

/// Convert a millisecond count into a [`Duration`].
#[must_use]
pub const fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Narrow a checked count into `usize`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value does not fit the platform word size.
pub fn to_usize(value: u64, field: &str) -> ConfigResult<usize> {
    usize::try_from(value)
        .map_err(|_| ConfigError::invalid(field, "must fit within usize", Some(value.to_string())))
}

fn check_range(number: u64, field: &str, range: RangeInclusive<u64>) -> ConfigResult<u64> {
    if range.contains(&number) {
        Ok(number)
    } else {
        Err(ConfigError::invalid(
            field,
            "out of accepted range",
            Some(number.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_bounded_accepts_values_in_range() {
        let parsed = parse_bounded(&json!(300), "debounce_ms", 0..=10_000).expect("in range");
        assert_eq!(parsed, 300);
    }

    #[test]
    fn parse_bounded_rejects_negative_and_non_numeric() {
        let err = parse_bounded(&json!(-1), "debounce_ms", 0..=10_000).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField { reason: "must be a non-negative integer", .. }
        ));

        let err = parse_bounded(&json!("fast"), "debounce_ms", 0..=10_000).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { .. }));
    }

    #[test]
    fn parse_bounded_str_reports_out_of_range() {
        let err = parse_bounded_str("70000", "success_display_ms", 1..=60_000).unwrap_err();
        match err {
            ConfigError::InvalidField { field, reason, value } => {
                assert_eq!(field, "success_display_ms");
                assert_eq!(reason, "out of accepted range");
                assert_eq!(value.as_deref(), Some("70000"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_bounded_str_trims_whitespace() {
        assert_eq!(parse_bounded_str(" 42 ", "event_buffer", 1..=100).unwrap(), 42);
    }
}
