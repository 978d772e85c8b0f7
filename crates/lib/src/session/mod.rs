//! Session store.
//!
//! Keeps the signed-in user in a single well-known storage slot and enforces
//! a fixed time-to-live. Every public operation degrades instead of failing:
//! storage and parse faults are logged, reads fall back to "no session", and
//! writes report an [`Outcome`].
//!
//! Authentication itself happens elsewhere; this module only persists its
//! result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{Clock, Outcome, Result, config::SessionConfig, platform::Platform};

pub mod errors;
mod record;

pub use errors::SessionError;
pub use record::{Role, SessionRecord, SessionUpdate};

const NO_STORAGE: &str = "no storage capability";
const NO_SESSION: &str = "no active session";

/// Reads, writes and expires the session record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    platform: Platform,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(platform: Platform, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        if platform.storage().is_none() {
            debug!("Session store created without storage; all writes are no-ops");
        }
        Self {
            platform,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Persist `user` with a fresh expiry of now + session duration.
    pub fn save_session(&self, user: SessionRecord) -> Outcome {
        let now = self.clock.now();
        self.write_record(user, now)
    }

    /// Record a successful login: stamps creation and login time, then saves.
    pub fn login(&self, mut user: SessionRecord) -> Outcome {
        let now = self.clock.now();
        user.created_at = now;
        user.last_login = now;
        let outcome = self.write_record(user, now);
        if outcome.is_applied() {
            info!("Session started");
        }
        outcome
    }

    /// The current session, or `None` if absent, unreadable or expired.
    ///
    /// An expired record is evicted as a side effect.
    pub fn get_session(&self) -> Option<SessionRecord> {
        let storage = self.platform.storage()?;
        let slot = &self.config.storage_key;

        let raw = match storage.get_item(slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(slot = %slot, "Failed to read session slot: {e}");
                return None;
            }
        };

        let record = match decode(slot, &raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("{e}: {}", source_message(&e));
                return None;
            }
        };

        if record.is_expired_at(self.clock.now_millis()) {
            info!(user = %record.id, "Session expired, clearing");
            self.clear_session();
            return None;
        }

        Some(record)
    }

    /// Merge `partial` over the current session and refresh its timestamps.
    ///
    /// Does nothing when there is no current session.
    pub fn update_session(&self, partial: SessionUpdate) -> Outcome {
        let Some(mut record) = self.get_session() else {
            debug!("update_session called without an active session");
            return Outcome::Skipped(NO_SESSION);
        };
        let now = self.clock.now();
        record.apply(partial);
        record.last_login = now;
        self.write_record(record, now)
    }

    /// Remove the session slot.
    pub fn clear_session(&self) -> Outcome {
        let Some(storage) = self.platform.storage() else {
            return Outcome::Skipped(NO_STORAGE);
        };
        match storage.remove_item(&self.config.storage_key) {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("Failed to clear session: {e}");
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub fn is_session_valid(&self) -> bool {
        self.get_session().is_some()
    }

    /// Guard for protected views.
    ///
    /// Returns the session when valid. Otherwise redirects to `redirect_to`
    /// (or the configured login path) if navigation is available, and
    /// returns `None`.
    pub fn require_auth(&self, redirect_to: Option<&str>) -> Option<SessionRecord> {
        if let Some(session) = self.get_session() {
            return Some(session);
        }
        let target = redirect_to.unwrap_or(&self.config.login_redirect);
        if let Some(navigator) = self.platform.navigator() {
            debug!(to = target, "Unauthenticated, redirecting");
            navigator.redirect(target);
        }
        None
    }

    /// Clear the session, then redirect to `redirect_to` (or the configured
    /// logout path) if navigation is available.
    pub fn logout(&self, redirect_to: Option<&str>) -> Outcome {
        let outcome = self.clear_session();
        if outcome.is_applied() {
            info!("Session ended");
        }
        if let Some(navigator) = self.platform.navigator() {
            navigator.redirect(redirect_to.unwrap_or(&self.config.logout_redirect));
        }
        outcome
    }

    fn write_record(&self, mut record: SessionRecord, now: DateTime<Utc>) -> Outcome {
        let Some(storage) = self.platform.storage() else {
            return Outcome::Skipped(NO_STORAGE);
        };
        record.session_expiry = Some(now.timestamp_millis() + self.config.duration_ms);

        let result: Result<()> = encode(&record)
            .and_then(|json| storage.set_item(&self.config.storage_key, &json));
        match result {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!(user = %record.id, "Failed to save session: {e}");
                Outcome::Failed(e.to_string())
            }
        }
    }
}

fn encode(record: &SessionRecord) -> Result<String> {
    serde_json::to_string(record)
        .map_err(|source| SessionError::SerializationFailed { source }.into())
}

fn decode(slot: &str, raw: &str) -> std::result::Result<SessionRecord, SessionError> {
    serde_json::from_str(raw).map_err(|source| SessionError::Malformed {
        slot: slot.to_string(),
        source,
    })
}

fn source_message(err: &SessionError) -> String {
    std::error::Error::source(err)
        .map(|s| s.to_string())
        .unwrap_or_default()
}
