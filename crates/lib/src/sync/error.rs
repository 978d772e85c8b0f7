//! Error types for the synchronization module.

use thiserror::Error;

/// Errors that can occur during synchronization operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// Sync was requested while connectivity is down.
    #[error("Cannot sync while offline")]
    Offline,

    /// The remote answered with a non-success status.
    #[error("Remote rejected batch with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(String),

    /// The configured remote endpoint is unusable.
    #[error("Invalid remote endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// No remote has been configured for this manager.
    #[error("No remote configured")]
    NoRemote,

    /// Command channel send error.
    #[error("Failed to send command to background sync: {0}")]
    CommandSendError(String),
}

impl SyncError {
    /// Check if this error was caused by missing connectivity.
    pub fn is_offline(&self) -> bool {
        matches!(self, SyncError::Offline)
    }

    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::RemoteRejected { .. }
        )
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidEndpoint { .. } | SyncError::NoRemote
        )
    }

    /// HTTP status returned by the remote, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<SyncError> for crate::Error {
    fn from(err: SyncError) -> Self {
        crate::Error::Sync(err)
    }
}
