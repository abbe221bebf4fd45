//! Pure per-field validation.
//!
//! Rules run in declaration order and the first failing rule's message wins;
//! messages never concatenate. Rules other than [`Rule::Required`] ignore empty
//! values, so optional fields only need to omit `Required`.

use autosave_config::defaults::MAX_UPLOAD_BYTES;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::descriptor::FieldDescriptor;
use crate::value::RawValue;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});
static LOOSE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("digit pattern is valid"));
static NPWP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}\.\d{3}\.\d{3}\.\d{1}-\d{3}\.\d{3}$").expect("npwp pattern is valid")
});

/// Outcome of validating a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// Value satisfies every rule.
    Valid,
    /// First failing rule's message.
    Invalid(&'static str),
}

impl ValidationResult {
    /// `true` for [`ValidationResult::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Failure message, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(*message),
        }
    }
}

/// Built-in format patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Conservative address check: local part, domain, alphabetic TLD of two or more letters.
    Email,
    /// Anything shaped like `x@y.z` without whitespace.
    LooseEmail,
    /// ASCII digits only.
    Digits,
    /// Grouped tax id `NN.NNN.NNN.N-NNN.NNN`.
    Npwp,
}

impl Pattern {
    /// Test `text` against the pattern.
    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        let regex: &Regex = match self {
            Self::Email => &*EMAIL,
            Self::LooseEmail => &*LOOSE_EMAIL,
            Self::Digits => &*DIGITS,
            Self::Npwp => &*NPWP,
        };
        regex.is_match(text)
    }
}

/// A single validation rule with the message reported when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must not be empty.
    Required(&'static str),
    /// Text must match the pattern.
    Pattern(Pattern, &'static str),
    /// Text must have at least this many characters.
    MinChars(usize, &'static str),
    /// Text must have at most this many characters.
    MaxChars(usize, &'static str),
    /// Text must have exactly this many characters.
    ExactChars(usize, &'static str),
    /// File must not exceed the validator's upload ceiling.
    MaxUpload(&'static str),
}

/// Validator carrying the context-dependent limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    max_upload_bytes: u64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}

impl Validator {
    /// Validator enforcing the given upload ceiling.
    #[must_use]
    pub const fn new(max_upload_bytes: u64) -> Self {
        Self { max_upload_bytes }
    }

    /// Validate `value` against the descriptor's rules.
    #[must_use]
    pub fn validate(&self, descriptor: &FieldDescriptor, value: &RawValue) -> ValidationResult {
        self.check(descriptor.rules, value)
    }

    /// Validate `value` against an explicit rule list.
    #[must_use]
    pub fn check(&self, rules: &[Rule], value: &RawValue) -> ValidationResult {
        rules
            .iter()
            .find_map(|rule| self.failure(rule, value))
            .map_or(ValidationResult::Valid, ValidationResult::Invalid)
    }

    fn failure(&self, rule: &Rule, value: &RawValue) -> Option<&'static str> {
        match (rule, value) {
            (Rule::Required(message), RawValue::Empty) => Some(*message),
            (Rule::Pattern(pattern, message), RawValue::Text(text)) => {
                (!pattern.matches(text)).then_some(*message)
            }
            (Rule::MinChars(min, message), RawValue::Text(text)) => {
                (text.chars().count() < *min).then_some(*message)
            }
            (Rule::MaxChars(max, message), RawValue::Text(text)) => {
                (text.chars().count() > *max).then_some(*message)
            }
            (Rule::ExactChars(len, message), RawValue::Text(text)) => {
                (text.chars().count() != *len).then_some(*message)
            }
            (Rule::MaxUpload(message), RawValue::File(handle)) => {
                (handle.file().size() > self.max_upload_bytes).then_some(*message)
            }
            _ => None,
        }
    }
}
