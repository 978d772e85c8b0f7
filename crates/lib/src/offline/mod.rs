//! Offline key-value store.
//!
//! The [`OfflineStore`] trait is the local-first cache behind every
//! [`OfflineBinding`](crate::OfflineBinding): values keyed by string plus an
//! ordered queue of [`PendingMutation`]s awaiting upload. Writes must be
//! durable before they resolve; draining the queue is the
//! [`SyncManager`](crate::SyncManager)'s job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

pub mod errors;
mod in_memory;
mod persistence;

pub use errors::StoreError;
pub use in_memory::InMemory;

/// What a pending mutation does to its key on the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MutationOp {
    /// Create or overwrite the key with `value`.
    Upsert { value: Value },
    /// Remove the key.
    Delete,
}

/// A local change waiting to be pushed to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMutation {
    pub id: Uuid,
    pub key: String,
    #[serde(flatten)]
    pub op: MutationOp,
    pub queued_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn upsert(key: impl Into<String>, value: Value, queued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            op: MutationOp::Upsert { value },
            queued_at,
        }
    }

    pub fn delete(key: impl Into<String>, queued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            op: MutationOp::Delete,
            queued_at,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.op, MutationOp::Delete)
    }
}

/// Durable local storage with a pending-mutation queue.
///
/// Implementations must be `Send` and `Sync`: a single store is shared by
/// every binding, the sync manager and the connectivity indicator.
#[async_trait]
pub trait OfflineStore: Send + Sync + std::fmt::Debug {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key` and queue an upsert.
    ///
    /// Resolves only once the write is durable.
    async fn save(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key` and queue a delete. Missing keys are a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Ordered copy of the pending-mutation queue, oldest first.
    async fn get_sync_queue(&self) -> Result<Vec<PendingMutation>>;

    /// Drop mutations the remote has accepted. Returns how many were removed.
    async fn acknowledge(&self, ids: &[Uuid]) -> Result<usize>;

    /// All stored keys, sorted.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Typed helpers available on every [`OfflineStore`].
#[async_trait]
pub trait OfflineStoreExt: OfflineStore {
    /// Fetch and decode the value under `key`.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| {
                    StoreError::ValueDecode {
                        key: key.to_string(),
                        source,
                    }
                    .into()
                }),
            None => Ok(None),
        }
    }

    /// Encode and store `value` under `key`.
    async fn save_as<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::ValueEncode {
            key: key.to_string(),
            source,
        })?;
        self.save(key, value).await
    }

    /// Number of queued mutations.
    async fn pending_count(&self) -> Result<usize> {
        Ok(self.get_sync_queue().await?.len())
    }
}

impl<S: OfflineStore + ?Sized> OfflineStoreExt for S {}
