use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use sarsync::{
    Config, FixedClock, InMemory, MemoryStorage, OfflineStore, PendingMutation, Platform,
    RecordingNavigator, Result, Services, SessionConfig, SessionStore, Storage, SyncConfig,
    offline::StoreError,
    platform::PlatformError,
    sync::{Remote, SyncError},
};
use serde_json::Value;
use uuid::Uuid;

/// Session store over in-process storage with a pinned clock.
pub struct SessionFixture {
    pub store: SessionStore,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub clock: Arc<FixedClock>,
}

pub fn session_fixture() -> SessionFixture {
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let clock = Arc::new(FixedClock::default());
    let store = SessionStore::new(
        Platform::new(storage.clone(), navigator.clone()),
        clock.clone(),
        SessionConfig::default(),
    );
    SessionFixture {
        store,
        storage,
        navigator,
        clock,
    }
}

/// Storage over a [`MemoryStorage`] whose operations can be told to fail.
#[derive(Debug, Default)]
pub struct FailingStorage {
    pub inner: MemoryStorage,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn refuse(&self, flag: &AtomicBool, key: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(PlatformError::StorageIo {
                key: key.to_string(),
                source: std::io::Error::other("storage refused by test"),
            }
            .into());
        }
        Ok(())
    }
}

impl Storage for FailingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.refuse(&self.fail_get, key)?;
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.refuse(&self.fail_set, key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.refuse(&self.fail_remove, key)?;
        self.inner.remove_item(key)
    }
}

/// Session store over a [`FailingStorage`] with a pinned clock.
pub fn failing_session_fixture() -> (SessionStore, Arc<FailingStorage>, Arc<FixedClock>) {
    let storage = Arc::new(FailingStorage::new());
    let clock = Arc::new(FixedClock::default());
    let store = SessionStore::new(
        Platform::headless().with_storage(storage.clone()),
        clock.clone(),
        SessionConfig::default(),
    );
    (store, storage, clock)
}

/// Store wrapper that records saves and can be told to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: InMemory,
    pub saves: Mutex<Vec<(String, Value)>>,
    pub fail_saves: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> Vec<(String, Value)> {
        self.saves.lock().unwrap().clone()
    }

    fn refuse(&self, flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: format!("{what} refused by test"),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl OfflineStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.refuse(&self.fail_reads, "read")?;
        self.inner.get(key).await
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        self.saves
            .lock()
            .unwrap()
            .push((key.to_string(), value.clone()));
        self.refuse(&self.fail_saves, "save")?;
        self.inner.save(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn get_sync_queue(&self) -> Result<Vec<PendingMutation>> {
        self.refuse(&self.fail_reads, "queue read")?;
        self.inner.get_sync_queue().await
    }

    async fn acknowledge(&self, ids: &[Uuid]) -> Result<usize> {
        self.inner.acknowledge(ids).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }
}

/// Remote that records every batch it is given.
#[derive(Debug, Default)]
pub struct RecordingRemote {
    pub pushes: AtomicUsize,
    pub received: Mutex<Vec<PendingMutation>>,
    pub fail: AtomicBool,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn received_keys(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.key.clone())
            .collect()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Remote for RecordingRemote {
    fn kind(&self) -> &'static str {
        "recording"
    }

    async fn push(&self, mutations: &[PendingMutation]) -> Result<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::RemoteRejected {
                status: 503,
                body: "maintenance".into(),
            }
            .into());
        }
        self.received.lock().unwrap().extend_from_slice(mutations);
        Ok(())
    }
}

/// Services over a [`FlakyStore`] and a [`RecordingRemote`].
pub struct TestServices {
    pub services: Services,
    pub store: Arc<FlakyStore>,
    pub remote: Arc<RecordingRemote>,
}

pub fn test_services(online: bool) -> TestServices {
    test_services_with(Config::default().with_sync(SyncConfig::default().with_start_online(online)))
}

pub fn test_services_with(config: Config) -> TestServices {
    let store = Arc::new(FlakyStore::new());
    let remote = Arc::new(RecordingRemote::new());
    let services = Services::builder()
        .store(store.clone())
        .remote(remote.clone())
        .clock(Arc::new(FixedClock::default()))
        .config(config)
        .build();
    TestServices {
        services,
        store,
        remote,
    }
}

/// Poll `check` until it holds or about a second has passed.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}
