//! Runtime configuration for the sarsync services.
//!
//! Every section has sensible defaults; callers override individual values
//! with the `with_*` setters.

use std::time::Duration;

use crate::constants::{
    DEFAULT_LOGIN_REDIRECT, DEFAULT_LOGOUT_REDIRECT, DEFAULT_PERIODIC_SYNC_INTERVAL,
    DEFAULT_POLL_INTERVAL, DEFAULT_SYNC_BATCH_SIZE, SESSION_DURATION_MS, SESSION_KEY,
};

/// Top-level configuration consumed by [`Services`](crate::Services).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub session: SessionConfig,
    pub sync: SyncConfig,
    pub indicator: IndicatorConfig,
}

impl Config {
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_indicator(mut self, indicator: IndicatorConfig) -> Self {
        self.indicator = indicator;
        self
    }
}

/// Session store settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage slot the record is written to.
    pub storage_key: String,
    /// Session lifetime in milliseconds.
    pub duration_ms: i64,
    /// Default target for `require_auth`.
    pub login_redirect: String,
    /// Default target for `logout`.
    pub logout_redirect: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: SESSION_KEY.to_string(),
            duration_ms: SESSION_DURATION_MS,
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
            logout_redirect: DEFAULT_LOGOUT_REDIRECT.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_login_redirect(mut self, to: impl Into<String>) -> Self {
        self.login_redirect = to.into();
        self
    }

    pub fn with_logout_redirect(mut self, to: impl Into<String>) -> Self {
        self.logout_redirect = to.into();
        self
    }
}

/// Sync manager and background sync settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Pending mutations pushed per remote request. Zero is treated as one.
    pub batch_size: usize,
    /// Interval at which background sync retries a non-empty queue.
    pub periodic_interval: Duration,
    /// Connectivity assumed at startup.
    pub start_online: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            periodic_interval: DEFAULT_PERIODIC_SYNC_INTERVAL,
            start_online: true,
        }
    }
}

impl SyncConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_periodic_interval(mut self, interval: Duration) -> Self {
        self.periodic_interval = interval;
        self
    }

    pub fn with_start_online(mut self, online: bool) -> Self {
        self.start_online = online;
        self
    }

    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Connectivity indicator settings.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    /// How often the pending queue length is polled.
    pub poll_interval: Duration,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl IndicatorConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
