//! Trailing-edge debouncing keyed per field.
//!
//! # Design
//! - One registry per form session; dropping the registry cancels every pending timer.
//! - Rescheduling a key aborts its pending timer and restarts the delay.
//! - A timer that has already fired runs its action to completion; only waiting
//!   timers are cancelled.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::sync::lock;

struct Pending {
    ticket: u64,
    handle: JoinHandle<()>,
}

struct Registry<K> {
    next_ticket: u64,
    timers: HashMap<K, Pending>,
}

/// Per-owner registry of delayed actions.
pub struct Debouncer<K> {
    runtime: Handle,
    registry: Arc<Mutex<Registry<K>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    /// Registry spawning timers on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            registry: Arc::new(Mutex::new(Registry {
                next_ticket: 0,
                timers: HashMap::new(),
            })),
        }
    }

    /// Run `action` once `delay` passes without another `schedule` for `key`.
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_ticket += 1;
        let ticket = registry.next_ticket;
        if let Some(previous) = registry.timers.remove(&key) {
            trace!(?key, "restarting debounce timer");
            previous.handle.abort();
        }

        let weak = Arc::downgrade(&self.registry);
        let task_key = key.clone();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(registry) = weak.upgrade() else {
                return;
            };
            {
                let mut registry = lock(&registry);
                let current = registry
                    .timers
                    .get(&task_key)
                    .is_some_and(|pending| pending.ticket == ticket);
                if !current {
                    return;
                }
                registry.timers.remove(&task_key);
            }
            drop(registry);
            action.await;
        });
        registry.timers.insert(key, Pending { ticket, handle });
    }

    /// Cancel the pending action for `key`; returns `true` if one was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        lock(&self.registry)
            .timers
            .remove(key)
            .map(|pending| pending.handle.abort())
            .is_some()
    }

    /// Cancel every pending action.
    pub fn cancel_all(&self) {
        let drained: Vec<Pending> = lock(&self.registry)
            .timers
            .drain()
            .map(|(_, pending)| pending)
            .collect();
        for pending in drained {
            pending.handle.abort();
        }
    }

    /// `true` while an action for `key` is waiting.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.registry).timers.contains_key(key)
    }

    /// Number of waiting actions.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.registry).timers.len()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let mut registry = lock(&self.registry);
        for (_, pending) in registry.timers.drain() {
            pending.handle.abort();
        }
    }
}
