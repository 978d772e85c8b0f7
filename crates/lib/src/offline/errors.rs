//! Error types for the offline store.
//!
//! Structured errors for store operations, in place of string-based errors.

use thiserror::Error;

/// Errors that can occur during offline store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored value could not be converted into the requested type.
    #[error("Value for key {key:?} has an unexpected shape")]
    ValueDecode {
        /// The key whose value failed to decode
        key: String,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be converted into JSON for storage.
    #[error("Value for key {key:?} could not be encoded")]
    ValueEncode {
        /// The key being written
        key: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the store file failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserializing the store file failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The store refused the operation (used by wrapping stores and test doubles).
    #[error("Store unavailable: {reason}")]
    Unavailable {
        /// Why the store could not serve the request
        reason: String,
    },
}

impl StoreError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StoreError::FileIo { .. }
                | StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
        )
    }

    /// Check if a value had the wrong shape for its caller.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            StoreError::ValueDecode { .. } | StoreError::ValueEncode { .. }
        )
    }

    /// The key involved in the failure, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::ValueDecode { key, .. } | StoreError::ValueEncode { key, .. } => Some(key),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
