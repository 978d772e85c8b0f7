//!
//! sarsync: offline-first client state for the SAR school portal.
//! This library keeps the signed-in user and the user's edits usable without
//! a network, and reconciles queued edits with the remote service once
//! connectivity returns.
//!
//! ## Core Concepts
//!
//! * **Sessions (`session::SessionStore`)**: A single user record in a storage slot with a 24 hour lifetime, plus auth-gating helpers that redirect through a `platform::Navigator`.
//! * **Platform (`platform::Platform`)**: The host capabilities (persistent `Storage`, page `Navigator`) decided once at construction. A headless platform turns dependent operations into no-ops.
//! * **Offline store (`offline::OfflineStore`)**: A local key-value cache that records every write as a `PendingMutation` in an ordered queue.
//! * **Sync (`sync::SyncManager`)**: Tracks connectivity and drains the queue through a `sync::Remote`. `sync::BackgroundSync` re-triggers it on reconnect and on a timer.
//! * **Bindings (`binding::OfflineBinding`)**: Observable state tied to one store key: load on activation, apply-then-persist-then-sync on update.
//! * **Indicator (`indicator::ConnectivityIndicator`)**: Polls the queue length and mirrors connectivity for a status badge.
//! * **Services (`services::Services`)**: The application root that wires the above together.

pub mod binding;
pub mod clock;
pub mod config;
pub mod constants;
pub mod indicator;
pub mod offline;
pub mod outcome;
pub mod platform;
pub mod services;
pub mod session;
pub mod sync;

pub use binding::{BindingState, LoadOutcome, OfflineBinding, UpdateOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, IndicatorConfig, SessionConfig, SyncConfig};
pub use indicator::{Badge, ConnectivityIndicator, IndicatorHandle, IndicatorStatus};
pub use offline::{InMemory, MutationOp, OfflineStore, OfflineStoreExt, PendingMutation};
pub use outcome::Outcome;
pub use platform::{FileStorage, MemoryStorage, Navigator, Platform, RecordingNavigator, Storage};
pub use services::{Services, ServicesBuilder};
pub use session::{Role, SessionRecord, SessionStore, SessionUpdate};
pub use sync::{SyncManager, SyncReport};

/// Result type used throughout the sarsync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the sarsync library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from host storage
    #[error(transparent)]
    Platform(platform::PlatformError),

    /// Structured errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured errors from the offline store
    #[error(transparent)]
    Store(offline::StoreError),

    /// Structured errors from the sync module
    #[error(transparent)]
    Sync(sync::SyncError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Platform(_) => "platform",
            Error::Session(_) => "session",
            Error::Store(_) => "offline",
            Error::Sync(_) => "sync",
        }
    }

    /// Check if this error indicates a file or slot was not found.
    pub fn is_not_found(&self) -> bool {
        let io = match self {
            Error::Io(e) => Some(e),
            Error::Store(offline::StoreError::FileIo { source }) => Some(source),
            Error::Platform(platform::PlatformError::StorageIo { source, .. }) => Some(source),
            _ => None,
        };
        io.is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Platform(platform_err) => platform_err.is_io_error(),
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if stored data had an unexpected shape.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Session(session_err) => session_err.is_malformed(),
            Error::Store(store_err) => store_err.is_value_error(),
            _ => false,
        }
    }

    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if this error was caused by missing connectivity.
    pub fn is_offline(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_offline(),
            _ => false,
        }
    }

    /// Check if this error comes from a missing or unusable remote setup.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_configuration_error(),
            _ => false,
        }
    }
}
