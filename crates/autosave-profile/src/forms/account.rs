//! Account credentials form.

use autosave_core::{FieldDescriptor, FormSpec, Pattern, Rule};

/// Account fields.
pub static FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new("name", "name").rules(&[
        Rule::Required("Name is required"),
        Rule::MinChars(3, "Name must be at least 3 characters"),
    ]),
    FieldDescriptor::new("email", "email").rules(&[
        Rule::Required("Email is required"),
        Rule::Pattern(Pattern::LooseEmail, "Email is invalid"),
    ]),
    FieldDescriptor::new("password", "password").rules(&[
        Rule::Required("Password is required"),
        Rule::MinChars(6, "Password must be at least 6 characters"),
    ]),
];

/// Account form.
pub static ACCOUNT: FormSpec = FormSpec::new("account", &FIELDS);
