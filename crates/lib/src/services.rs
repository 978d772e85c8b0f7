//! Application root.
//!
//! [`Services`] owns the explicitly constructed collaborators: session store,
//! offline store and sync manager. Hosts build one at startup and hand out
//! clones; there is no global instance.
//!
//! ```
//! use std::sync::Arc;
//! use sarsync::{MemoryStorage, Platform, RecordingNavigator, Services};
//!
//! let services = Services::builder()
//!     .platform(Platform::new(
//!         Arc::new(MemoryStorage::new()),
//!         Arc::new(RecordingNavigator::new()),
//!     ))
//!     .build();
//! assert!(services.session().get_session().is_none());
//! ```

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    Clock, OfflineBinding, SystemClock,
    config::Config,
    indicator::ConnectivityIndicator,
    offline::{InMemory, OfflineStore},
    platform::Platform,
    session::SessionStore,
    sync::{BackgroundHandle, BackgroundSync, DetachedRemote, Remote, SyncManager},
};

/// Shared handle to the session store, offline store and sync manager.
///
/// Cloning is cheap; clones share every service.
#[derive(Debug, Clone)]
pub struct Services {
    session: SessionStore,
    store: Arc<dyn OfflineStore>,
    sync: Arc<SyncManager>,
    config: Config,
}

impl Services {
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::default()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn OfflineStore> {
        &self.store
    }

    pub fn sync(&self) -> &Arc<SyncManager> {
        &self.sync
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A binding for `key`, not yet activated.
    pub fn binding<T>(&self, key: impl Into<String>, initial: T) -> OfflineBinding<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        OfflineBinding::new(key, initial, self.store.clone(), self.sync.clone())
    }

    /// An indicator following this manager's connectivity. Call
    /// [`spawn`](ConnectivityIndicator::spawn) to start polling.
    pub fn indicator(&self) -> ConnectivityIndicator {
        ConnectivityIndicator::new(
            self.store.clone(),
            self.sync.subscribe(),
            self.config.indicator.clone(),
        )
    }

    /// Start the background sync engine on the current tokio runtime.
    pub fn start_background_sync(&self) -> BackgroundHandle {
        BackgroundSync::start(self.sync.clone())
    }
}

/// Builder for [`Services`].
///
/// Anything left unset gets a default: a headless platform, a volatile
/// [`InMemory`] store, a [`DetachedRemote`], the [`SystemClock`] and
/// `Config::default()`.
#[derive(Debug, Default)]
pub struct ServicesBuilder {
    platform: Option<Platform>,
    store: Option<Arc<dyn OfflineStore>>,
    remote: Option<Arc<dyn Remote>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<Config>,
}

impl ServicesBuilder {
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn store(mut self, store: Arc<dyn OfflineStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn remote(mut self, remote: Arc<dyn Remote>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Services {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemory::with_clock(clock.clone())));
        let remote = self.remote.unwrap_or_else(|| Arc::new(DetachedRemote));
        debug!(remote = remote.kind(), "Building services");

        let session = SessionStore::new(
            self.platform.unwrap_or_default(),
            clock,
            config.session.clone(),
        );
        let sync = Arc::new(SyncManager::new(
            store.clone(),
            remote,
            config.sync.clone(),
        ));
        Services {
            session,
            store,
            sync,
            config,
        }
    }
}
