//! Constants used throughout the sarsync library.
//!
//! Central definitions for storage slot names, redirect targets and timing
//! defaults.

use std::time::Duration;

/// Storage slot holding the serialized session record.
pub const SESSION_KEY: &str = "sar_session";

/// Session lifetime in milliseconds (24 hours).
pub const SESSION_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Where `require_auth` sends unauthenticated users.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/auth/login";

/// Where `logout` sends users after clearing the session.
pub const DEFAULT_LOGOUT_REDIRECT: &str = "/";

/// How often the connectivity indicator re-reads the pending queue length.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How often background sync re-drains a non-empty queue while online.
pub const DEFAULT_PERIODIC_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum pending mutations pushed to the remote in one request.
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 50;

/// File name of the persisted offline store inside a data directory.
pub const STORE_FILE: &str = "offline.json";

/// Directory (inside a data directory) backing the session storage slot.
pub const SESSION_DIR: &str = "session";
