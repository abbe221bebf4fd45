//! Session-scoped cache of master-data option lists.
//!
//! Each list is fetched at most once successfully and then served from memory
//! for the lifetime of the owning session. Concurrent requests for the same
//! list share a single fetch; a failed fetch leaves the slot empty so a later
//! request retries.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::descriptor::OptionKind;
use crate::error::LoadError;
use crate::gateway::{OptionEntry, OptionSource};
use crate::sync::lock;

/// Shared, immutable option list.
pub type OptionList = Arc<[OptionEntry]>;

/// Per-session option cache.
pub struct OptionCatalog {
    source: Arc<dyn OptionSource>,
    lists: Mutex<HashMap<OptionKind, Arc<OnceCell<OptionList>>>>,
    failed: Mutex<HashSet<OptionKind>>,
}

impl OptionCatalog {
    /// Cache backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn OptionSource>) -> Self {
        Self {
            source,
            lists: Mutex::new(HashMap::new()),
            failed: Mutex::new(HashSet::new()),
        }
    }

    /// Return the cached list, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Options`] when the collaborator fails; nothing is cached.
    pub async fn load(&self, kind: OptionKind) -> Result<OptionList, LoadError> {
        let cell = Arc::clone(lock(&self.lists).entry(kind).or_default());
        let result = cell
            .get_or_try_init(|| async {
                debug!(%kind, "fetching option list");
                self.source
                    .fetch_option_list(kind)
                    .await
                    .map(OptionList::from)
            })
            .await;

        match result {
            Ok(list) => {
                lock(&self.failed).remove(&kind);
                Ok(Arc::clone(list))
            }
            Err(source) => {
                warn!(%kind, error = %source, "option list fetch failed");
                lock(&self.failed).insert(kind);
                Err(LoadError::Options { kind, source })
            }
        }
    }

    /// Cached list, if it has loaded.
    #[must_use]
    pub fn get(&self, kind: OptionKind) -> Option<OptionList> {
        lock(&self.lists)
            .get(&kind)
            .and_then(|cell| cell.get().cloned())
    }

    /// `true` when the last attempt to load `kind` failed.
    #[must_use]
    pub fn has_failed(&self, kind: OptionKind) -> bool {
        lock(&self.failed).contains(&kind)
    }

    /// Entry of `kind` whose value equals `value`, if the list is loaded.
    #[must_use]
    pub fn find(&self, kind: OptionKind, value: &str) -> Option<OptionEntry> {
        self.get(kind)?
            .iter()
            .find(|entry| entry.value == value)
            .cloned()
    }
}
