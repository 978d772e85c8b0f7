//! Platform capabilities.
//!
//! The session store needs two things from its host: a small persistent
//! key-value [`Storage`] and a [`Navigator`] able to perform a full-page
//! redirect. A host that lacks one of them (a server-side renderer, a test
//! harness, a headless worker) builds a [`Platform`] without it, and the
//! dependent operations become no-ops.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use crate::Result;

pub mod errors;
mod storage;

pub use errors::PlatformError;
pub use storage::{FileStorage, MemoryStorage};

/// Persistent string key-value storage, shaped like a browser's local storage.
pub trait Storage: Send + Sync + Debug {
    /// Read a slot. `Ok(None)` when the slot is empty.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an empty slot succeeds.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Full-page navigation.
pub trait Navigator: Send + Sync + Debug {
    fn redirect(&self, to: &str);
}

/// Navigator that only remembers where it was asked to go.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every redirect target, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.redirects().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, to: &str) {
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(to.to_string());
        }
    }
}

/// The set of capabilities available to the session store.
#[derive(Debug, Clone, Default)]
pub struct Platform {
    storage: Option<Arc<dyn Storage>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl Platform {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage: Some(storage),
            navigator: Some(navigator),
        }
    }

    /// A platform with no storage and no navigation.
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn storage(&self) -> Option<&Arc<dyn Storage>> {
        self.storage.as_ref()
    }

    pub fn navigator(&self) -> Option<&Arc<dyn Navigator>> {
        self.navigator.as_ref()
    }
}
