//! Static field tables for each profile section.
//!
//! Every table is declared once; the engine is generic over them.

pub mod account;
pub mod address;
pub mod biodata;
pub mod contact;

use autosave_core::OptionKind;

/// Occupations (`pekerjaan`).
pub const JOB: OptionKind = OptionKind::new("job");
/// Purchase purposes (`tujuan_beli`).
pub const PURPOSE: OptionKind = OptionKind::new("purpose");
/// Cities; each entry's parent is its province id.
pub const CITY: OptionKind = OptionKind::new("city");
/// Banks for the bank-account editor.
pub const BANK: OptionKind = OptionKind::new("bank");

pub use account::ACCOUNT;
pub use address::ADDRESS;
pub use biodata::BIODATA;
pub use contact::CONTACT;
