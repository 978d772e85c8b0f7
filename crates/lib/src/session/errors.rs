//! Error types for the session store.

use thiserror::Error;

/// Errors that can occur while encoding or decoding the session slot.
///
/// These never escape the public [`SessionStore`](super::SessionStore) API;
/// they are logged and turned into an [`Outcome`](crate::Outcome) or a
/// missing session.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The stored slot could not be parsed as a session record.
    #[error("Malformed session record in slot {slot:?}")]
    Malformed {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be serialized.
    #[error("Failed to serialize session record")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Check if the stored data was unreadable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SessionError::Malformed { .. })
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
