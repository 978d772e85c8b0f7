//! Offline data bindings.
//!
//! An [`OfflineBinding`] ties a piece of UI-visible state to one key of the
//! [`OfflineStore`]. Activation loads the stored value; every update is
//! applied in memory immediately, persisted locally, and then pushed to the
//! remote if the [`SyncManager`] reports connectivity.
//!
//! Nothing here retries. A write that could not be synced stays queued in
//! the store until something else triggers a sync (see
//! [`BackgroundSync`](crate::sync::BackgroundSync)).

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    Result,
    offline::{OfflineStore, OfflineStoreExt},
    sync::SyncManager,
};

/// Observable state of a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingState<T> {
    pub data: T,
    /// True until the first load for the current key settles.
    pub is_loading: bool,
    /// False from the moment an update is applied until a sync after it succeeds.
    pub is_synced: bool,
}

/// How an activation (or re-bind) settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored value replaced the current data.
    Loaded,
    /// Nothing stored under the key; the current data was kept.
    Missing,
    /// The load failed; the current data was kept. The fault was logged.
    Failed(String),
}

/// How an update settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Persisted locally and the follow-up sync succeeded.
    Synced,
    /// Persisted locally; offline, so no sync was attempted.
    Queued,
    /// Persisted locally, but the follow-up sync failed.
    SyncFailed(String),
    /// The local write failed. The in-memory state still holds the new value.
    PersistFailed(String),
}

impl UpdateOutcome {
    /// True if the value reached the local store.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, UpdateOutcome::PersistFailed(_))
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, UpdateOutcome::Synced)
    }
}

/// A live association between UI state and an offline store key.
///
/// Cloning is cheap; clones share key and state.
pub struct OfflineBinding<T> {
    key: Arc<Mutex<String>>,
    state: Arc<watch::Sender<BindingState<T>>>,
    /// Bumped by every local update; a sync only marks the binding synced if
    /// no newer update was applied while it ran.
    generation: Arc<AtomicU64>,
    store: Arc<dyn OfflineStore>,
    sync: Arc<SyncManager>,
}

impl<T> Clone for OfflineBinding<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
            store: self.store.clone(),
            sync: self.sync.clone(),
        }
    }
}

impl<T> std::fmt::Debug for OfflineBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineBinding")
            .field("key", &*self.lock_key())
            .finish_non_exhaustive()
    }
}

impl<T> OfflineBinding<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// A binding for `key` showing `initial` until activation loads.
    pub fn new(
        key: impl Into<String>,
        initial: T,
        store: Arc<dyn OfflineStore>,
        sync: Arc<SyncManager>,
    ) -> Self {
        let (state, _) = watch::channel(BindingState {
            data: initial,
            is_loading: true,
            is_synced: true,
        });
        Self {
            key: Arc::new(Mutex::new(key.into())),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            store,
            sync,
        }
    }

    /// Load the stored value for the current key.
    ///
    /// Loading is marked complete however the load ends.
    pub async fn activate(&self) -> LoadOutcome {
        let key = self.key();
        let loaded: Result<Option<T>> = self.store.get_as(&key).await;
        let outcome = match loaded {
            Ok(Some(value)) => {
                self.state.send_modify(|state| state.data = value);
                LoadOutcome::Loaded
            }
            Ok(None) => LoadOutcome::Missing,
            Err(e) => {
                warn!(key = %key, "Failed to load offline data: {e}");
                LoadOutcome::Failed(e.to_string())
            }
        };
        self.state.send_modify(|state| state.is_loading = false);
        debug!(key = %key, ?outcome, "Binding activated");
        outcome
    }

    /// Point the binding at another key and load it.
    ///
    /// The previous key is left as it is; no data is migrated.
    pub async fn rebind(&self, key: impl Into<String>) -> LoadOutcome {
        let key = key.into();
        *self.lock_key() = key;
        self.state.send_modify(|state| state.is_loading = true);
        self.activate().await
    }

    /// Apply `value`, persist it, and sync it if online.
    ///
    /// The in-memory state changes before the first suspension point, so the
    /// new value is visible even while the write is still in flight. The value
    /// is written under the key bound at call time.
    pub async fn update(&self, value: T) -> UpdateOutcome {
        let key = self.key();
        let generation = self.apply_local(value.clone());
        self.persist_and_sync(key, value, generation).await
    }

    /// Fire-and-forget [`update`](Self::update).
    ///
    /// The in-memory state is updated before this returns; persistence and
    /// sync continue on a spawned task.
    pub fn spawn_update(&self, value: T) -> JoinHandle<UpdateOutcome> {
        let key = self.key();
        let generation = self.apply_local(value.clone());
        let binding = self.clone();
        tokio::spawn(async move { binding.persist_and_sync(key, value, generation).await })
    }

    fn apply_local(&self, value: T) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.data = value;
            state.is_synced = false;
        });
        generation
    }

    async fn persist_and_sync(&self, key: String, value: T, generation: u64) -> UpdateOutcome {
        if let Err(e) = self.store.save_as(&key, &value).await {
            warn!(key = %key, "Failed to persist offline data: {e}");
            return UpdateOutcome::PersistFailed(e.to_string());
        }

        if !self.sync.is_currently_online() {
            debug!(key = %key, "Offline, change queued");
            return UpdateOutcome::Queued;
        }

        match self.sync.sync().await {
            Ok(_) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.state.send_modify(|state| state.is_synced = true);
                } else {
                    debug!(key = %key, "Newer update pending, leaving binding unsynced");
                }
                UpdateOutcome::Synced
            }
            Err(e) => {
                warn!(key = %key, "Sync after update failed: {e}");
                UpdateOutcome::SyncFailed(e.to_string())
            }
        }
    }

    /// Current value.
    pub fn data(&self) -> T {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn is_synced(&self) -> bool {
        self.state.borrow().is_synced
    }

    pub fn snapshot(&self) -> BindingState<T> {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<BindingState<T>> {
        self.state.subscribe()
    }
}

impl<T> OfflineBinding<T> {
    pub fn key(&self) -> String {
        self.lock_key().clone()
    }

    fn lock_key(&self) -> std::sync::MutexGuard<'_, String> {
        // A String cannot be left half-written, so a poisoned lock is still usable.
        self.key.lock().unwrap_or_else(|e| e.into_inner())
    }
}
