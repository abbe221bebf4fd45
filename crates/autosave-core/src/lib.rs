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

//! Per-field autosave engine.
//!
//! A form is declared once as a static [`FormSpec`] table. Mounting it yields a
//! [`FormSession`] that tracks each field's value against its last committed
//! value, validates on the field's trigger, and submits single-field partial
//! updates through the [`FieldSubmitter`] collaborator, never more than one in
//! flight per field.
//!
//! Layout: `descriptor.rs` + `validate.rs` (declarations and rules),
//! `state.rs` + `dirty.rs` + `store.rs` (field state), `debounce.rs`,
//! `coordinator.rs` (submission lanes), `session.rs` (mounting and UI events),
//! `events.rs` (notification bus), `gateway.rs` + `options.rs` (collaborators).

pub mod coordinator;
pub mod debounce;
pub mod descriptor;
pub mod dirty;
pub mod error;
pub mod events;
pub mod gateway;
pub mod options;
pub mod payload;
pub mod session;
pub mod state;
pub mod store;
mod sync;
pub mod validate;
pub mod value;

pub use coordinator::{GENERIC_FAILURE, SubmissionCoordinator, SubmitOutcome};
pub use debounce::Debouncer;
pub use descriptor::{
    Autofill, Editability, FieldDescriptor, FormSpec, LetterCase, Notices, OptionKind, Trigger,
};
pub use dirty::is_dirty;
pub use error::{GatewayError, LoadError, SessionError, SessionResult};
pub use events::{EventBus, EventEnvelope, EventId, EventStream, NoticeKind, SessionEvent};
pub use gateway::{
    Baseline, BaselineSource, FieldSubmitter, Gateways, OptionEntry, OptionSource,
};
pub use options::{OptionCatalog, OptionList};
pub use payload::{PayloadPart, PayloadValue, SubmissionPayload};
pub use session::{FormSession, LoadState};
pub use state::{FieldState, FieldStatus};
pub use store::FieldStore;
pub use validate::{Pattern, Rule, ValidationResult, Validator};
pub use value::{FileHandle, RawValue, UploadedFile};
