//! Domicile section ("Alamat Domisili"), including the KTP upload.

use autosave_core::{Editability, FieldDescriptor, FormSpec, Pattern, Rule, Trigger};

use super::{CITY, PURPOSE};
use crate::npwp::format_npwp;

/// Address fields, in display order.
pub static FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor::new("address", "alamat").rules(&[Rule::Required("Alamat harus diisi")]),
    FieldDescriptor::new("city", "kota")
        .rules(&[Rule::Required("Kota harus dipilih!")])
        .options(CITY)
        .companions(&["province"])
        .autofill("province"),
    // Filled from the selected city; never edited or submitted on its own.
    FieldDescriptor::new("province", "provinsi").editability(Editability::ReadOnly),
    FieldDescriptor::new("purpose", "tujuan_beli")
        .rules(&[Rule::Required("Tujuan Pembelian harus dipilih!")])
        .options(PURPOSE),
    FieldDescriptor::new("npwp", "npwp")
        .rules(&[
            Rule::Required("NPWP harus diisi"),
            Rule::Pattern(Pattern::Npwp, "Format NPWP tidak valid"),
        ])
        .input(format_npwp),
    FieldDescriptor::new("ktp", "file_ktp")
        .rules(&[
            Rule::Required("KTP harus diunggah"),
            Rule::MaxUpload("Ukuran file tidak boleh lebih dari 2MB"),
        ])
        .trigger(Trigger::OnChange)
        .notices("Foto KTP berhasil diunggah", "Foto KTP gagal diunggah"),
];

/// Address form.
pub static ADDRESS: FormSpec = FormSpec::new("address", &FIELDS);
