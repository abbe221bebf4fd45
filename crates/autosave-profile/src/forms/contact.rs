//! Contact form saved while typing.

use autosave_core::{FieldDescriptor, FormSpec, Trigger};

/// Contact fields.
pub static FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("name", "name")
        .trigger(Trigger::OnChangeDebounced)
        .failure_notice("Failed to save."),
    FieldDescriptor::new("email", "email")
        .trigger(Trigger::OnChangeDebounced)
        .failure_notice("Failed to save."),
];

/// Contact form.
pub static CONTACT: FormSpec = FormSpec::new("contact", &FIELDS);
