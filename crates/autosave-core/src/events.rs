//! Per-session notification bus.
//!
//! Every write to the field store, every load outcome and every global notice is
//! published here so the UI layer can re-render. The bus keeps a bounded replay
//! ring so a late subscriber can catch up from the last id it saw; when the
//! broadcast channel overflows, the oldest events are dropped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, Receiver, Sender};
use uuid::Uuid;

use crate::descriptor::OptionKind;
use crate::state::FieldState;
use crate::sync::lock;

/// Identifier assigned to each published event.
pub type EventId = u64;

/// Severity of a global notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational notice.
    Info,
    /// Something was saved.
    Success,
    /// Something failed.
    Error,
}

/// Events emitted by a form session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A field's state changed.
    FieldUpdated {
        /// Field name.
        field: &'static str,
        /// State after the write.
        state: FieldState,
    },
    /// The server baseline was applied.
    BaselineLoaded,
    /// The server baseline could not be loaded.
    LoadFailed {
        /// Human-readable reason.
        message: String,
    },
    /// An option list is available.
    OptionsLoaded {
        /// List that loaded.
        kind: OptionKind,
    },
    /// An option list could not be loaded.
    OptionsFailed {
        /// List that failed.
        kind: OptionKind,
        /// Human-readable reason.
        message: String,
    },
    /// Transient global notification (toast).
    Notice {
        /// Severity.
        kind: NoticeKind,
        /// Text to display.
        message: String,
    },
}

impl SessionEvent {
    /// Machine-friendly discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FieldUpdated { .. } => "field_updated",
            Self::BaselineLoaded => "baseline_loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::OptionsLoaded { .. } => "options_loaded",
            Self::OptionsFailed { .. } => "options_failed",
            Self::Notice { .. } => "notice",
        }
    }
}

/// Metadata wrapper around events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential id within the session.
    pub id: EventId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Session that emitted the event.
    pub session: Uuid,
    /// Form the session belongs to.
    pub form: &'static str,
    /// Event payload.
    pub event: SessionEvent,
}

/// Broadcast bus with a replay ring.
#[derive(Clone)]
pub struct EventBus {
    session: Uuid,
    form: &'static str,
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a bus for one session.
    ///
    /// A zero `capacity` is raised to one.
    #[must_use]
    pub fn new(session: Uuid, form: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            session,
            form,
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Publish an event, assigning it a sequential id.
    pub fn publish(&self, event: SessionEvent) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            session: self.session,
            form: self.form,
            event,
        };

        {
            let mut buffer = lock(&self.buffer);
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe, replaying buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        if let Some(since) = since_id {
            let buffer = lock(&self.buffer);
            backlog.extend(buffer.iter().filter(|item| item.id > since).cloned());
        }
        EventStream {
            backlog,
            receiver: self.sender.subscribe(),
        }
    }

    /// Last assigned id, if anything was published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        lock(&self.buffer).back().map(|event| event.id)
    }
}

/// Receiver yielding replayed events first, then live ones.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event; `None` once the session is gone.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive an event if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}
