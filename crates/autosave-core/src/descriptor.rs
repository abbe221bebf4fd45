//! Static, declarative field tables.
//!
//! # Design
//! - One [`FormSpec`] per form, built from `const` [`FieldDescriptor`]s.
//! - The engine loops over descriptors; nothing dispatches on field names.

use std::fmt;

use crate::payload::{PayloadPart, PayloadValue};
use crate::validate::Rule;
use crate::value::RawValue;

/// Identifier of a master-data option list (cities, jobs, banks, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionKind(&'static str);

impl OptionKind {
    /// Declare an option list by name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Name of the list.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Event that submits a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Submit when the input loses focus.
    OnBlur,
    /// Submit once typing pauses for the configured debounce window.
    OnChangeDebounced,
    /// Submit on every change (file pickers).
    OnChange,
}

/// Whether the user may edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editability {
    /// Always editable.
    Editable,
    /// Never edited by the user; only the baseline or an autofill writes it.
    ReadOnly,
    /// Editable until the baseline carries a value, read-only afterwards.
    LockedWhenPresent,
}

/// Case applied to text when encoding a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterCase {
    /// Send the text as entered.
    Verbatim,
    /// Upper-case the text before sending.
    Upper,
}

/// One-way push from a selected option into a linked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autofill {
    /// Field receiving the selected option's parent id.
    pub target: &'static str,
}

/// Per-field overrides for the global notification texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Notices {
    /// Text announced after a successful submission.
    pub success: Option<&'static str>,
    /// Text announced after a failed submission.
    pub failure: Option<&'static str>,
}

/// Immutable declaration of a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field name used by the UI layer.
    pub name: &'static str,
    /// Payload key the server expects.
    pub key: &'static str,
    /// Validation rules, evaluated in order.
    pub rules: &'static [Rule],
    /// Transform applied to text on every change.
    pub input: Option<fn(&str) -> String>,
    /// Case applied when encoding.
    pub case: LetterCase,
    /// Submission trigger.
    pub trigger: Trigger,
    /// Edit policy.
    pub editability: Editability,
    /// Fields whose encoded values travel in this field's payload.
    pub companions: &'static [&'static str],
    /// Option list the value is drawn from.
    pub options: Option<OptionKind>,
    /// Linked field filled from the selected option.
    pub autofill: Option<Autofill>,
    /// Notification text overrides.
    pub notices: Notices,
}

impl FieldDescriptor {
    /// Declare a blur-triggered, editable text field.
    #[must_use]
    pub const fn new(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            rules: &[],
            input: None,
            case: LetterCase::Verbatim,
            trigger: Trigger::OnBlur,
            editability: Editability::Editable,
            companions: &[],
            options: None,
            autofill: None,
            notices: Notices {
                success: None,
                failure: None,
            },
        }
    }

    /// Attach validation rules.
    #[must_use]
    pub const fn rules(mut self, rules: &'static [Rule]) -> Self {
        self.rules = rules;
        self
    }

    /// Attach an input transform.
    #[must_use]
    pub const fn input(mut self, transform: fn(&str) -> String) -> Self {
        self.input = Some(transform);
        self
    }

    /// Upper-case the value when encoding.
    #[must_use]
    pub const fn upper(mut self) -> Self {
        self.case = LetterCase::Upper;
        self
    }

    /// Change the submission trigger.
    #[must_use]
    pub const fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Change the edit policy.
    #[must_use]
    pub const fn editability(mut self, editability: Editability) -> Self {
        self.editability = editability;
        self
    }

    /// Declare companion fields sent alongside this one.
    #[must_use]
    pub const fn companions(mut self, companions: &'static [&'static str]) -> Self {
        self.companions = companions;
        self
    }

    /// Declare the option list the value is drawn from.
    #[must_use]
    pub const fn options(mut self, kind: OptionKind) -> Self {
        self.options = Some(kind);
        self
    }

    /// Push the selected option's parent id into `target`.
    #[must_use]
    pub const fn autofill(mut self, target: &'static str) -> Self {
        self.autofill = Some(Autofill { target });
        self
    }

    /// Override notification texts.
    #[must_use]
    pub const fn notices(mut self, success: &'static str, failure: &'static str) -> Self {
        self.notices = Notices {
            success: Some(success),
            failure: Some(failure),
        };
        self
    }

    /// Override only the failure text.
    #[must_use]
    pub const fn failure_notice(mut self, failure: &'static str) -> Self {
        self.notices.failure = Some(failure);
        self
    }

    /// Apply the input transform to freshly entered text.
    #[must_use]
    pub fn normalize(&self, value: RawValue) -> RawValue {
        match (self.input, value) {
            (Some(transform), RawValue::Text(text)) => RawValue::text(transform(&text)),
            (_, value) => value,
        }
    }

    /// Encode `value` as the payload part for this field.
    #[must_use]
    pub fn encode(&self, value: &RawValue) -> PayloadPart {
        let value = match value {
            RawValue::Empty => PayloadValue::Text(String::new()),
            RawValue::Text(text) => PayloadValue::Text(match self.case {
                LetterCase::Verbatim => text.clone(),
                LetterCase::Upper => text.to_uppercase(),
            }),
            RawValue::File(handle) => PayloadValue::File(handle.clone()),
        };
        PayloadPart {
            key: self.key,
            value,
        }
    }
}

/// Declaration of a whole form.
#[derive(Debug, Clone, Copy)]
pub struct FormSpec {
    /// Form identifier used in logs and events.
    pub id: &'static str,
    /// Field table, in display order.
    pub fields: &'static [FieldDescriptor],
}

impl FormSpec {
    /// Declare a form.
    #[must_use]
    pub const fn new(id: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { id, fields }
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Distinct option lists referenced by the form, in declaration order.
    #[must_use]
    pub fn option_kinds(&self) -> Vec<OptionKind> {
        let mut kinds: Vec<OptionKind> = Vec::new();
        for kind in self.fields.iter().filter_map(|field| field.options) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}
