//! Explicit results for operations that never return an error.
//!
//! Boundary operations such as saving a session swallow and log their faults.
//! They still report what happened through [`Outcome`] so callers and tests
//! can tell a degraded path from a successful one.

use std::fmt;

/// What a never-failing operation actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation took effect.
    Applied,
    /// The operation was intentionally skipped (missing capability, nothing to update).
    Skipped(&'static str),
    /// The operation was attempted and failed. The fault was logged.
    Failed(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Failure message, if the operation failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => f.write_str("applied"),
            Outcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            Outcome::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}
