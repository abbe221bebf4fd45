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

//! Settings for the autosave engine.
//!
//! Layout: `model.rs` (typed settings), `defaults.rs` (baseline values),
//! `validate.rs` (parsing helpers with range checks), `loader.rs` (JSON, file,
//! and environment sources).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::AutosaveConfig;
