//! Personal details section ("Biodata Diri").

use autosave_core::{Editability, FieldDescriptor, FormSpec, Pattern, Rule};

use super::JOB;

/// Biodata fields, in display order.
pub static FIELDS: [FieldDescriptor; 8] = [
    FieldDescriptor::new("name", "fullname")
        .rules(&[Rule::Required("Nama harus diisi")])
        .upper()
        .editability(Editability::ReadOnly),
    FieldDescriptor::new("email", "email")
        .rules(&[
            Rule::Required("Email harus diisi"),
            Rule::Pattern(Pattern::Email, "Email tidak valid"),
        ])
        .upper(),
    FieldDescriptor::new("phone", "no_telp_pribadi").rules(&[
        Rule::Required("Nomor HP harus diisi"),
        Rule::Pattern(Pattern::Digits, "Nomor HP hanya boleh mengandung angka"),
        Rule::MinChars(10, "nomor HP harus terdiri dari minimal 10 digit"),
        Rule::MaxChars(15, "Nomor HP tidak boleh lebih dari 15 digit"),
    ]),
    FieldDescriptor::new("nik", "no_ktp")
        .rules(&[
            Rule::Required("NIK harus diisi"),
            Rule::ExactChars(16, "NIK harus 16 karakter"),
        ])
        .editability(Editability::LockedWhenPresent),
    FieldDescriptor::new("job", "pekerjaan")
        .rules(&[Rule::Required("Pekerjaan harus diisi")])
        .options(JOB),
    FieldDescriptor::new("gender", "jenis_kelamin")
        .rules(&[Rule::Required("Jenis Kelamin harus diisi")]),
    FieldDescriptor::new("placeOfBirth", "tempat_lahir")
        .rules(&[Rule::Required("Tempat Lahir harus diisi")])
        .upper(),
    FieldDescriptor::new("dateOfBirth", "tgl_lahir")
        .rules(&[Rule::Required("Tanggal Lahir harus diisi")])
        .editability(Editability::LockedWhenPresent),
];

/// Biodata form.
pub static BIODATA: FormSpec = FormSpec::new("biodata", &FIELDS);
