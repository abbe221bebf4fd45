//! Field state store.
//!
//! The store is the only place field state changes. Every write publishes a
//! [`SessionEvent::FieldUpdated`] so the UI can re-render immediately. Once
//! closed, the store refuses writes so late results cannot touch state that
//! belongs to an unmounted form.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::descriptor::FormSpec;
use crate::events::{EventBus, SessionEvent};
use crate::state::FieldState;
use crate::sync::lock;

/// Map from field name to state, owned by exactly one session.
pub struct FieldStore {
    spec: &'static FormSpec,
    fields: Mutex<HashMap<&'static str, FieldState>>,
    bus: EventBus,
    closed: AtomicBool,
}

impl FieldStore {
    /// Store with one empty state per declared field.
    #[must_use]
    pub fn new(spec: &'static FormSpec, bus: EventBus) -> Self {
        let fields = spec
            .fields
            .iter()
            .map(|field| (field.name, FieldState::default()))
            .collect();
        Self {
            spec,
            fields: Mutex::new(fields),
            bus,
            closed: AtomicBool::new(false),
        }
    }

    /// Current state of `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<FieldState> {
        lock(&self.fields).get(field).cloned()
    }

    /// All states in declaration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(&'static str, FieldState)> {
        let fields = lock(&self.fields);
        self.spec
            .fields
            .iter()
            .filter_map(|field| {
                fields
                    .get(field.name)
                    .map(|state| (field.name, state.clone()))
            })
            .collect()
    }

    /// Mutate `field` and notify subscribers.
    ///
    /// The event is published under the store lock, so events for a field
    /// arrive in the order the writes were applied.
    ///
    /// Returns `None` without writing when the store is closed or the field is unknown.
    pub fn update<R>(
        &self,
        field: &'static str,
        apply: impl FnOnce(&mut FieldState) -> R,
    ) -> Option<R> {
        let mut fields = lock(&self.fields);
        if self.is_closed() {
            return None;
        }
        let state = fields.get_mut(field)?;
        let result = apply(state);
        let state = state.clone();
        self.bus.publish(SessionEvent::FieldUpdated { field, state });
        drop(fields);
        Some(result)
    }

    /// Refuse all further writes.
    pub fn close(&self) {
        let _fields = lock(&self.fields);
        self.closed.store(true, Ordering::Release);
    }

    /// `true` once [`FieldStore::close`] ran.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::value::RawValue;
    use uuid::Uuid;

    static FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor::new("address", "alamat"),
        FieldDescriptor::new("npwp", "npwp"),
    ];
    static FORM: FormSpec = FormSpec::new("address", &FIELDS);

    #[test]
    fn writes_notify_and_closed_store_refuses() {
        let bus = EventBus::new(Uuid::nil(), FORM.id, 8);
        let mut stream = bus.subscribe(None);
        let store = FieldStore::new(&FORM, bus);

        let written = store.update("address", |state| {
            state.value = RawValue::from("Jl. Merdeka 1");
        });
        assert!(written.is_some());
        let envelope = stream.try_next().expect("field update event");
        assert!(matches!(
            envelope.event,
            SessionEvent::FieldUpdated { field: "address", .. }
        ));

        store.close();
        assert!(store.update("address", |state| state.value = RawValue::Empty).is_none());
        assert_eq!(
            store.get("address").map(|state| state.value),
            Some(RawValue::from("Jl. Merdeka 1"))
        );
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn snapshot_follows_declaration_order() {
        let store = FieldStore::new(&FORM, EventBus::new(Uuid::nil(), FORM.id, 8));
        let names: Vec<_> = store.snapshot().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["address", "npwp"]);
        assert!(store.update("missing", |_| ()).is_none());
    }

    #[test]
    fn last_event_matches_state_under_concurrent_writes() {
        let bus = EventBus::new(Uuid::nil(), FORM.id, 256);
        let mut stream = bus.subscribe(None);
        let store = FieldStore::new(&FORM, bus);
        let counter = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        store.update("npwp", |state| {
                            let next = counter.fetch_add(1, Ordering::SeqCst);
                            state.value = RawValue::text(next.to_string());
                        });
                    }
                });
            }
        });

        let mut seen = Vec::new();
        while let Some(envelope) = stream.try_next() {
            if let SessionEvent::FieldUpdated { state, .. } = envelope.event {
                seen.push(state.value);
            }
        }
        let expected: Vec<RawValue> = (0..200).map(|n| RawValue::text(n.to_string())).collect();
        assert_eq!(seen, expected);
        assert_eq!(
            store.get("npwp").map(|state| state.value),
            seen.last().cloned()
        );
    }
}
