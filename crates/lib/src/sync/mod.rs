//! Synchronization of the offline store with the remote service.
//!
//! [`SyncManager`] tracks last-known connectivity and drains the store's
//! pending-mutation queue through a [`Remote`]. It is safe to call
//! [`SyncManager::sync`] opportunistically and repeatedly: concurrent calls
//! are serialized, and an empty queue is a cheap no-op.
//!
//! [`BackgroundSync`] is the long-running companion that re-triggers sync on
//! connectivity transitions and on a timer, which is how writes left unsynced
//! by a failed attempt eventually reach the remote.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::{Result, config::SyncConfig, offline::OfflineStore};

pub mod background;
pub mod error;
pub mod remote;

pub use background::{BackgroundHandle, BackgroundSync, SyncCommand};
pub use error::SyncError;
pub use remote::{DetachedRemote, HttpRemote, Remote};

/// Result of a completed sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Mutations the remote accepted during this pass.
    pub pushed: usize,
    /// Mutations still queued when the pass finished.
    pub remaining: usize,
}

/// Drains pending mutations against the remote when connectivity allows.
#[derive(Debug)]
pub struct SyncManager {
    store: Arc<dyn OfflineStore>,
    remote: Arc<dyn Remote>,
    online: watch::Sender<bool>,
    /// Serializes sync passes so two callers never push the same batch.
    pass: Mutex<()>,
    config: SyncConfig,
}

impl SyncManager {
    pub fn new(store: Arc<dyn OfflineStore>, remote: Arc<dyn Remote>, config: SyncConfig) -> Self {
        let (online, _) = watch::channel(config.start_online);
        Self {
            store,
            remote,
            online,
            pass: Mutex::new(()),
            config,
        }
    }

    /// Last-known connectivity.
    pub fn is_currently_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Record a connectivity transition. Returns whether the state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "Connectivity changed");
        }
        changed
    }

    /// Watch connectivity transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn OfflineStore> {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Push every queued mutation to the remote, batch by batch.
    ///
    /// Each accepted batch is acknowledged in the store before the next one
    /// is sent. If the remote fails midway the error is returned and the
    /// unsent mutations stay queued for a later pass.
    pub async fn sync(&self) -> Result<SyncReport> {
        if !self.is_currently_online() {
            return Err(SyncError::Offline.into());
        }
        let _pass = self.pass.lock().await;

        let queue = self.store.get_sync_queue().await?;
        if queue.is_empty() {
            debug!("Sync queue empty");
            return Ok(SyncReport::default());
        }

        let total = queue.len();
        let mut pushed = 0;
        for batch in queue.chunks(self.config.effective_batch_size()) {
            if !self.is_currently_online() {
                warn!(pushed, total, "Went offline during sync");
                return Err(SyncError::Offline.into());
            }
            if let Err(e) = self.remote.push(batch).await {
                warn!(remote = self.remote.kind(), pushed, total, "Sync push failed: {e}");
                return Err(e);
            }
            let ids: Vec<_> = batch.iter().map(|m| m.id).collect();
            pushed += self.store.acknowledge(&ids).await?;
        }

        let remaining = self.store.get_sync_queue().await?.len();
        info!(pushed, remaining, "Sync pass complete");
        Ok(SyncReport { pushed, remaining })
    }
}
