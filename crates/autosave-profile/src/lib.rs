#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Customer profile forms built on the autosave engine.
//!
//! Layout: `forms/` (static field tables per section), `customer.rs` (server
//! record and baseline adapter), `bank.rs` (record-level bank-account editor),
//! `npwp.rs` (tax-number input mask), `page.rs` (the assembled profile page).

pub mod bank;
pub mod customer;
pub mod error;
pub mod forms;
pub mod npwp;
pub mod page;

pub use bank::{BankAccount, BankAccountEditor, BankAccountGateway, BankOutcome};
pub use customer::{CustomerBaselines, CustomerRecord, CustomerSource};
pub use error::{ProfileError, ProfileResult};
pub use npwp::format_npwp;
pub use page::{ProfileGateways, ProfilePage};
