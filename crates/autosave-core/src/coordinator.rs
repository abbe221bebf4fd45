//! Submission coordinator.
//!
//! # Design
//! - One lane per field. A lane admits one submission at a time; a request that
//!   arrives while the lane is busy waits for the in-flight call to resolve and
//!   then re-reads the latest value, so a newer edit supersedes a stale one.
//! - At most one request waits per lane. Further requests coalesce into it,
//!   since the waiter reads the latest value anyway.
//! - Lanes are independent; different fields submit concurrently.
//! - Collaborator failures become field state here and never propagate.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::descriptor::{Editability, FieldDescriptor, FormSpec};
use crate::dirty::is_dirty;
use crate::events::{NoticeKind, SessionEvent};
use crate::payload::SubmissionPayload;
use crate::session::SessionShared;
use crate::state::FieldStatus;
use crate::validate::ValidationResult;
use crate::value::RawValue;

/// Failure text used when neither the server nor the field supplies one.
pub const GENERIC_FAILURE: &str = "Terjadi error";

/// Result of one `submit_field` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The collaborator accepted the value; it is now committed.
    Submitted,
    /// Value already committed; nothing was sent.
    Unchanged,
    /// Validation rejected the value; nothing was sent.
    Invalid,
    /// The collaborator failed; the field shows a retryable error.
    Failed,
    /// Another request for this field is already queued and will read the latest value.
    ///
    /// The queued request's result is not reported to this caller; watch
    /// [`SessionEvent::FieldUpdated`] for the field's final status.
    Coalesced,
    /// Baseline or the field's option list is not loaded.
    Blocked,
    /// The session closed; any result was dropped.
    Discarded,
}

enum Step {
    Invalid,
    Clean,
    Send(RawValue),
}

struct Lane {
    gate: AsyncMutex<()>,
    queued: AtomicBool,
}

// Holds the lane's single waiting slot; frees it even if the waiter is dropped.
struct QueuedSlot<'a>(&'a AtomicBool);

impl Drop for QueuedSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-field serialization of submissions.
pub struct SubmissionCoordinator {
    lanes: HashMap<&'static str, Lane>,
}

impl SubmissionCoordinator {
    /// One lane per declared field.
    #[must_use]
    pub fn new(spec: &FormSpec) -> Self {
        let lanes = spec
            .fields
            .iter()
            .map(|field| {
                (
                    field.name,
                    Lane {
                        gate: AsyncMutex::new(()),
                        queued: AtomicBool::new(false),
                    },
                )
            })
            .collect();
        Self { lanes }
    }

    /// `true` while a submission for `field` holds its lane.
    #[must_use]
    pub fn is_busy(&self, field: &str) -> bool {
        self.lanes
            .get(field)
            .is_some_and(|lane| lane.gate.try_lock().is_err())
    }

    pub(crate) async fn submit(
        &self,
        shared: &Arc<SessionShared>,
        field: &'static FieldDescriptor,
    ) -> SubmitOutcome {
        if field.editability == Editability::ReadOnly {
            return SubmitOutcome::Unchanged;
        }
        let Some(lane) = self.lanes.get(field.name) else {
            return SubmitOutcome::Unchanged;
        };

        let _turn = if let Ok(guard) = lane.gate.try_lock() {
            guard
        } else {
            if lane.queued.swap(true, Ordering::AcqRel) {
                debug!(field = field.name, "submission already queued");
                return SubmitOutcome::Coalesced;
            }
            let slot = QueuedSlot(&lane.queued);
            debug!(field = field.name, "waiting for in-flight submission");
            let guard = lane.gate.lock().await;
            drop(slot);
            guard
        };

        run(shared, field).await
    }
}

async fn run(shared: &Arc<SessionShared>, field: &'static FieldDescriptor) -> SubmitOutcome {
    let store = &shared.store;
    if store.is_closed() {
        return SubmitOutcome::Discarded;
    }
    if shared.is_blocked(field) {
        debug!(field = field.name, "submission blocked until data loads");
        return SubmitOutcome::Blocked;
    }

    if store
        .update(field.name, |state| state.status = FieldStatus::Validating)
        .is_none()
    {
        return SubmitOutcome::Discarded;
    }

    let step = store.update(field.name, |state| {
        if let ValidationResult::Invalid(message) = shared.validator.validate(field, &state.value) {
            state.error = Some(message.to_string());
            state.status = FieldStatus::Idle;
            return Step::Invalid;
        }
        state.error = None;
        if is_dirty(state) {
            state.status = FieldStatus::Submitting;
            Step::Send(state.value.clone())
        } else {
            state.status = FieldStatus::Idle;
            Step::Clean
        }
    });

    let value = match step {
        None => return SubmitOutcome::Discarded,
        Some(Step::Invalid) => {
            debug!(field = field.name, "validation rejected value");
            return SubmitOutcome::Invalid;
        }
        Some(Step::Clean) => return SubmitOutcome::Unchanged,
        Some(Step::Send(value)) => value,
    };

    let (payload, companions) = build_payload(shared, field, &value);
    debug!(field = field.name, keys = ?payload.keys(), "submitting field");
    let result = shared.gateways.submitter.submit_single_field(payload).await;

    if store.is_closed() {
        debug!(field = field.name, "session closed while in flight; result dropped");
        return SubmitOutcome::Discarded;
    }

    match result {
        Ok(()) => {
            store.update(field.name, |state| {
                state.committed = value;
                state.error = None;
                state.status = FieldStatus::Succeeded;
            });
            for (name, submitted) in companions {
                store.update(name, |state| state.committed = submitted);
            }
            store.update(field.name, |state| {
                state.status = FieldStatus::Idle;
                state.saved = true;
            });
            shared.schedule_saved_clear(field.name);
            if let Some(message) = field.notices.success {
                shared.bus.publish(SessionEvent::Notice {
                    kind: NoticeKind::Success,
                    message: message.to_string(),
                });
            }
            info!(field = field.name, "field saved");
            SubmitOutcome::Submitted
        }
        Err(err) => {
            let notice = field.notices.failure.unwrap_or(GENERIC_FAILURE);
            let inline = err
                .server_message()
                .map_or_else(|| notice.to_string(), ToString::to_string);
            store.update(field.name, |state| {
                state.status = FieldStatus::Failed;
                state.error = Some(inline);
            });
            shared.bus.publish(SessionEvent::Notice {
                kind: NoticeKind::Error,
                message: notice.to_string(),
            });
            warn!(field = field.name, error = %err, "field submission failed");
            SubmitOutcome::Failed
        }
    }
}

fn build_payload(
    shared: &SessionShared,
    field: &'static FieldDescriptor,
    value: &RawValue,
) -> (SubmissionPayload, Vec<(&'static str, RawValue)>) {
    let mut parts = vec![field.encode(value)];
    let mut companions = Vec::with_capacity(field.companions.len());
    for name in field.companions {
        let Some(companion) = shared.spec.field(name) else {
            continue;
        };
        let current = shared
            .store
            .get(companion.name)
            .map(|state| state.value)
            .unwrap_or_default();
        parts.push(companion.encode(&current));
        companions.push((companion.name, current));
    }
    let payload = SubmissionPayload {
        form: shared.spec.id,
        field: field.name,
        parts,
    };
    (payload, companions)
}
