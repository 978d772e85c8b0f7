//! In-memory offline store with optional JSON file persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    OfflineStore, PendingMutation,
    persistence::{self, StoreState},
};
use crate::{Clock, Result, SystemClock};

/// A simple offline store keeping entries and the pending queue in memory.
///
/// Created with [`InMemory::new`] it is volatile and suitable for tests.
/// Created with [`InMemory::open`] it mirrors its whole state to a JSON file
/// and rewrites that file after every mutation, before the mutation resolves.
#[derive(Debug)]
pub struct InMemory {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemory {
    /// Creates a new, empty, volatile store.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Volatile store stamping queued mutations with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            path: None,
            clock,
        }
    }

    /// Opens a file-backed store, loading `path` if it exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = persistence::load_from_file(&path).await?;
        info!(
            path = %path.display(),
            entries = state.entries.len(),
            pending = state.queue.len(),
            "Opened offline store"
        );
        Ok(Self {
            state: RwLock::new(state),
            path: Some(path),
            clock,
        })
    }

    /// File backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes a snapshot of the current state to `path`.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let state = self.state.read().await;
        persistence::save_to_file(&state, path.as_ref()).await
    }

    async fn flush(&self, state: &StoreState) -> Result<()> {
        if let Some(path) = &self.path {
            persistence::save_to_file(state, path).await?;
        }
        Ok(())
    }

    /// Apply `change` to a copy of the state, persist it, then commit it.
    ///
    /// A failed flush leaves the in-memory state untouched, so memory never
    /// runs ahead of disk.
    async fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState) + Send,
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        change(&mut next);
        self.flush(&next).await?;
        *state = next;
        Ok(())
    }
}

#[async_trait]
impl OfflineStore for InMemory {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.state.read().await.entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        let mutation = PendingMutation::upsert(key, value.clone(), self.clock.now());
        self.mutate(|state| {
            state.entries.insert(key.to_string(), value);
            state.queue.push(mutation);
        })
        .await?;
        debug!(key, "Saved offline entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if !self.state.read().await.entries.contains_key(key) {
            return Ok(());
        }
        let mutation = PendingMutation::delete(key, self.clock.now());
        self.mutate(|state| {
            if state.entries.remove(key).is_some() {
                state.queue.push(mutation);
            }
        })
        .await?;
        debug!(key, "Deleted offline entry");
        Ok(())
    }

    async fn get_sync_queue(&self) -> Result<Vec<PendingMutation>> {
        Ok(self.state.read().await.queue.clone())
    }

    async fn acknowledge(&self, ids: &[Uuid]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut removed = 0;
        self.mutate(|state| {
            let before = state.queue.len();
            state.queue.retain(|m| !ids.contains(&m.id));
            removed = before - state.queue.len();
        })
        .await?;
        Ok(removed)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.entries.keys().cloned().collect())
    }
}
