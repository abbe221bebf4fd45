//! Form session: the unit a UI layer mounts for one form.
//!
//! # Design
//! - A session owns its field store, event bus, option cache, timers and
//!   submission lanes. Nothing is shared between sessions.
//! - UI event handlers (`set_value`, `change`, `blur`) are synchronous; any
//!   submission they trigger runs as a tracked task on the session's runtime.
//! - Closing (or dropping) the session cancels pending timers and makes the
//!   store refuse writes, so in-flight results are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use autosave_config::AutosaveConfig;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::coordinator::{SubmissionCoordinator, SubmitOutcome};
use crate::debounce::Debouncer;
use crate::descriptor::{Editability, FieldDescriptor, FormSpec, OptionKind, Trigger};
use crate::error::{LoadError, SessionError, SessionResult};
use crate::events::{EventBus, EventId, EventStream, SessionEvent};
use crate::gateway::{Baseline, Gateways};
use crate::options::{OptionCatalog, OptionList};
use crate::state::FieldState;
use crate::store::FieldStore;
use crate::sync::lock;
use crate::validate::Validator;
use crate::value::RawValue;

/// Progress of the initial baseline load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Baseline requested, not yet answered.
    Loading,
    /// Baseline applied; submissions may proceed.
    Ready,
    /// Baseline failed; submissions are blocked until a reload succeeds.
    Failed {
        /// Form-level message.
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TimerKey {
    Submit(&'static str),
    SavedFlash(&'static str),
}

pub(crate) struct SessionShared {
    id: Uuid,
    pub(crate) spec: &'static FormSpec,
    pub(crate) config: AutosaveConfig,
    pub(crate) validator: Validator,
    pub(crate) store: FieldStore,
    pub(crate) bus: EventBus,
    pub(crate) gateways: Gateways,
    pub(crate) catalog: OptionCatalog,
    pub(crate) coordinator: SubmissionCoordinator,
    timers: Debouncer<TimerKey>,
    load: Mutex<LoadState>,
    baseline_applied: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    runtime: Handle,
    span: Span,
}

impl SessionShared {
    /// Baseline not ready, or the field's option list has not loaded.
    pub(crate) fn is_blocked(&self, field: &FieldDescriptor) -> bool {
        if *lock(&self.load) != LoadState::Ready {
            return true;
        }
        field
            .options
            .is_some_and(|kind| self.catalog.get(kind).is_none())
    }

    pub(crate) fn schedule_saved_clear(self: &Arc<Self>, field: &'static str) {
        let weak = Arc::downgrade(self);
        self.timers.schedule(
            TimerKey::SavedFlash(field),
            self.config.success_display,
            async move {
                if let Some(shared) = weak.upgrade() {
                    shared.store.update(field, |state| state.saved = false);
                }
            },
        );
    }

    fn schedule_submit(self: &Arc<Self>, field: &'static FieldDescriptor) {
        let weak = Arc::downgrade(self);
        self.timers
            .schedule(TimerKey::Submit(field.name), self.config.debounce, async move {
                if let Some(shared) = weak.upgrade() {
                    shared.spawn_submit(field);
                }
            });
    }

    fn spawn_submit(self: &Arc<Self>, field: &'static FieldDescriptor) {
        self.start_submit(field);
    }

    /// Run a submission as a tracked task; the receiver yields its outcome.
    ///
    /// The task owns the lane for its whole run, so a caller that stops
    /// waiting cannot leave the field half-submitted.
    fn start_submit(
        self: &Arc<Self>,
        field: &'static FieldDescriptor,
    ) -> Option<oneshot::Receiver<SubmitOutcome>> {
        if self.store.is_closed() {
            return None;
        }
        let (reply, outcome) = oneshot::channel();
        let shared = Arc::clone(self);
        let task = async move {
            let outcome = shared.coordinator.submit(&shared, field).await;
            debug!(field = field.name, ?outcome, "submission finished");
            // Nobody may be waiting any more.
            let _ = reply.send(outcome);
        };
        let handle = self.runtime.spawn(task.instrument(self.span.clone()));
        let mut tasks = lock(&self.tasks);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        Some(outcome)
    }

    fn apply_baseline(&self, baseline: &Baseline) -> bool {
        if self.baseline_applied.swap(true, Ordering::AcqRel) {
            return false;
        }
        for field in self.spec.fields {
            let seeded = baseline.get(field.name).cloned().unwrap_or_default();
            let locked = field.editability == Editability::LockedWhenPresent && !seeded.is_empty();
            self.store.update(field.name, move |state| {
                // Keep edits made while the baseline was unavailable.
                if state.value == state.committed {
                    state.value = seeded.clone();
                }
                state.committed = seeded;
                state.locked = locked;
            });
        }
        true
    }

    fn autofill(&self, source: &FieldDescriptor, target: &'static str) {
        let parent = source
            .options
            .zip(self.store.get(source.name))
            .and_then(|(kind, state)| {
                state
                    .value
                    .as_text()
                    .and_then(|text| self.catalog.find(kind, text))
            })
            .and_then(|entry| entry.parent);
        debug!(field = source.name, target, ?parent, "autofilling linked field");
        self.store
            .update(target, |state| state.value = RawValue::from(parent));
    }
}

/// One mounted form.
pub struct FormSession {
    shared: Arc<SessionShared>,
}

impl FormSession {
    /// Mount `spec`: load the baseline and every declared option list concurrently.
    ///
    /// Load failures do not fail the mount; they are published on the event bus
    /// and block dependent submissions until a reload succeeds.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub async fn mount(spec: &'static FormSpec, gateways: Gateways, config: AutosaveConfig) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("form_session", form = spec.id, session = %id);
        let bus = EventBus::new(id, spec.id, config.event_buffer);
        let runtime = Handle::current();
        let shared = Arc::new(SessionShared {
            id,
            spec,
            validator: Validator::new(config.max_upload_bytes),
            store: FieldStore::new(spec, bus.clone()),
            bus,
            catalog: OptionCatalog::new(Arc::clone(&gateways.options)),
            coordinator: SubmissionCoordinator::new(spec),
            gateways,
            config,
            timers: Debouncer::new(runtime.clone()),
            load: Mutex::new(LoadState::Loading),
            baseline_applied: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
            runtime,
            span: span.clone(),
        });
        let session = Self { shared };

        async {
            info!("mounting form");
            let (baseline, ()) = tokio::join!(session.load_baseline(), session.load_all_options());
            if baseline.is_ok() {
                info!("form ready");
            }
        }
        .instrument(span)
        .await;
        session
    }

    /// Session identifier, carried on every event envelope.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Form this session edits.
    #[must_use]
    pub fn spec(&self) -> &'static FormSpec {
        self.shared.spec
    }

    /// Baseline load progress.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        lock(&self.shared.load).clone()
    }

    /// Record a new value for `field` without triggering a submission.
    ///
    /// The descriptor's input transform runs first. Selecting an option on a
    /// field with an autofill dependency pushes the option's parent into the
    /// linked field.
    ///
    /// # Errors
    ///
    /// Unknown fields, non-editable fields and closed sessions are rejected.
    pub fn set_value(&self, field: &str, value: impl Into<RawValue>) -> SessionResult<()> {
        let descriptor = self.descriptor(field)?;
        self.ensure_open()?;
        let read_only = SessionError::ReadOnlyField {
            form: self.shared.spec.id,
            field: descriptor.name,
        };
        if descriptor.editability == Editability::ReadOnly {
            return Err(read_only);
        }

        let value = descriptor.normalize(value.into());
        let written = self
            .shared
            .store
            .update(descriptor.name, |state| {
                if state.locked {
                    return false;
                }
                state.value = value;
                true
            })
            .ok_or_else(|| self.closed())?;
        if !written {
            return Err(read_only);
        }

        if let Some(autofill) = descriptor.autofill {
            self.shared.autofill(descriptor, autofill.target);
        }
        Ok(())
    }

    /// UI change event: record the value and apply the field's trigger policy.
    ///
    /// # Errors
    ///
    /// Same as [`FormSession::set_value`].
    pub fn change(&self, field: &str, value: impl Into<RawValue>) -> SessionResult<()> {
        self.set_value(field, value)?;
        let descriptor = self.descriptor(field)?;
        match descriptor.trigger {
            Trigger::OnBlur => {}
            Trigger::OnChangeDebounced => self.shared.schedule_submit(descriptor),
            Trigger::OnChange => self.shared.spawn_submit(descriptor),
        }
        Ok(())
    }

    /// UI blur event.
    ///
    /// Blur-triggered fields submit now; a debounced field with a pending timer
    /// is flushed immediately.
    ///
    /// # Errors
    ///
    /// Unknown fields and closed sessions are rejected.
    pub fn blur(&self, field: &str) -> SessionResult<()> {
        let descriptor = self.descriptor(field)?;
        self.ensure_open()?;
        match descriptor.trigger {
            Trigger::OnBlur => self.shared.spawn_submit(descriptor),
            Trigger::OnChangeDebounced => {
                if self.shared.timers.cancel(&TimerKey::Submit(descriptor.name)) {
                    self.shared.spawn_submit(descriptor);
                }
            }
            Trigger::OnChange => {}
        }
        Ok(())
    }

    /// Validate and, when dirty, submit `field`, waiting for the outcome.
    ///
    /// The submission runs as a tracked background task. Dropping the returned
    /// future stops waiting but does not cancel the submission; [`FormSession::settle`]
    /// still waits for it.
    ///
    /// # Errors
    ///
    /// Unknown fields and closed sessions are rejected; collaborator failures
    /// are reported through [`SubmitOutcome::Failed`] and field state instead.
    pub async fn submit_field(&self, field: &str) -> SessionResult<SubmitOutcome> {
        let descriptor = self.descriptor(field)?;
        self.ensure_open()?;
        let Some(outcome) = self.shared.start_submit(descriptor) else {
            return Ok(SubmitOutcome::Discarded);
        };
        Ok(outcome.await.unwrap_or(SubmitOutcome::Discarded))
    }

    /// Current state of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownField`] for undeclared names.
    pub fn state(&self, field: &str) -> SessionResult<FieldState> {
        let descriptor = self.descriptor(field)?;
        self.shared
            .store
            .get(descriptor.name)
            .ok_or_else(|| self.unknown(field))
    }

    /// Every field's state, in declaration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(&'static str, FieldState)> {
        self.shared.store.snapshot()
    }

    /// Subscribe to session events, replaying anything after `since`.
    #[must_use]
    pub fn subscribe(&self, since: Option<EventId>) -> EventStream {
        self.shared.bus.subscribe(since)
    }

    /// Cached option list, if loaded.
    #[must_use]
    pub fn options(&self, kind: OptionKind) -> Option<OptionList> {
        self.shared.catalog.get(kind)
    }

    /// `true` while a submission for `field` is in flight.
    #[must_use]
    pub fn is_submitting(&self, field: &str) -> bool {
        self.shared.coordinator.is_busy(field)
    }

    /// Load (or retry) one option list.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Options`] when the collaborator fails.
    pub async fn load_options(&self, kind: OptionKind) -> Result<OptionList, LoadError> {
        let result = self.shared.catalog.load(kind).await;
        match &result {
            Ok(_) => {
                self.shared.bus.publish(SessionEvent::OptionsLoaded { kind });
            }
            Err(err) => {
                self.shared.bus.publish(SessionEvent::OptionsFailed {
                    kind,
                    message: err.display_message(),
                });
            }
        }
        result
    }

    /// Retry a failed baseline load. A baseline that already applied is never
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Baseline`] when the collaborator fails again.
    pub async fn reload_baseline(&self) -> Result<(), LoadError> {
        self.load_baseline()
            .instrument(self.shared.span.clone())
            .await
    }

    /// Wait for every background submission spawned so far.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<_> = lock(&self.shared.tasks).drain(..).collect();
            if pending.is_empty() {
                return;
            }
            for task in pending {
                if let Err(err) = task.await
                    && !err.is_cancelled()
                {
                    warn!(error = %err, "background submission panicked");
                }
            }
        }
    }

    /// Cancel pending timers and discard results of in-flight submissions.
    pub fn close(&self) {
        if self.shared.store.is_closed() {
            return;
        }
        self.shared.store.close();
        self.shared.timers.cancel_all();
        let _entered = self.shared.span.enter();
        debug!("form session closed");
    }

    /// `true` once [`FormSession::close`] ran.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.store.is_closed()
    }

    async fn load_baseline(&self) -> Result<(), LoadError> {
        let shared = &self.shared;
        if shared.baseline_applied.load(Ordering::Acquire) {
            return Ok(());
        }
        *lock(&shared.load) = LoadState::Loading;

        match shared.gateways.baseline.load_baseline(shared.spec.id).await {
            Ok(baseline) => {
                if shared.apply_baseline(&baseline) {
                    *lock(&shared.load) = LoadState::Ready;
                    shared.bus.publish(SessionEvent::BaselineLoaded);
                    debug!("baseline applied");
                }
                Ok(())
            }
            Err(source) => {
                let err = LoadError::Baseline {
                    form: shared.spec.id,
                    source,
                };
                let message = err.display_message();
                warn!(error = %err, detail = ?err, "baseline load failed");
                *lock(&shared.load) = LoadState::Failed {
                    message: message.clone(),
                };
                shared.bus.publish(SessionEvent::LoadFailed { message });
                Err(err)
            }
        }
    }

    async fn load_all_options(&self) {
        for kind in self.shared.spec.option_kinds() {
            // Failures are published and retried via `load_options`.
            let _ = self.load_options(kind).await;
        }
    }

    fn descriptor(&self, field: &str) -> SessionResult<&'static FieldDescriptor> {
        self.shared
            .spec
            .field(field)
            .ok_or_else(|| self.unknown(field))
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.shared.store.is_closed() {
            Err(self.closed())
        } else {
            Ok(())
        }
    }

    fn unknown(&self, field: &str) -> SessionError {
        SessionError::UnknownField {
            form: self.shared.spec.id,
            field: field.to_string(),
        }
    }

    fn closed(&self) -> SessionError {
        SessionError::Closed {
            form: self.shared.spec.id,
        }
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.close();
    }
}
