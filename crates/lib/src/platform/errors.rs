//! Error types for platform capabilities.

use thiserror::Error;

/// Errors raised by [`Storage`](super::Storage) implementations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The key cannot be mapped onto the storage medium.
    #[error("Invalid storage key: {key:?}")]
    InvalidKey {
        /// The rejected key
        key: String,
    },

    /// Reading or writing the backing medium failed.
    #[error("Storage I/O error for key {key:?}")]
    StorageIo {
        /// The key being accessed
        key: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A lock guarding in-process storage was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl PlatformError {
    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, PlatformError::StorageIo { .. })
    }

    /// The key involved in the failure, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            PlatformError::InvalidKey { key } | PlatformError::StorageIo { key, .. } => Some(key),
            PlatformError::LockPoisoned => None,
        }
    }
}

impl From<PlatformError> for crate::Error {
    fn from(err: PlatformError) -> Self {
        crate::Error::Platform(err)
    }
}
