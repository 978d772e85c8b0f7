//! Persistence operations for the InMemory store
//!
//! Serializes the store state (entries and pending queue) to a versioned JSON
//! document and loads it back.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{PendingMutation, StoreError};
use crate::{Error, Result};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk shape of the store.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct StoreState {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    pub(crate) entries: BTreeMap<String, Value>,
    #[serde(default)]
    pub(crate) queue: Vec<PendingMutation>,
}

/// Writes the store state to `path` as JSON.
///
/// The document is written to a temp file next to `path` and renamed over
/// it, so a crash mid-write leaves the previous state intact.
pub(crate) async fn save_to_file(state: &StoreState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })
}

/// Loads the store state from `path`.
///
/// A missing file yields an empty state.
pub(crate) async fn load_from_file(path: &Path) -> Result<StoreState> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::DeserializationFailed { source: e }.into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
        Err(e) => Err(StoreError::FileIo { source: e }.into()),
    }
}
