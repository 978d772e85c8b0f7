//! Time provider abstraction
//!
//! Session expiry and pending-mutation timestamps are all read through a
//! [`Clock`], so production code uses real time while tests pin it.
//!
//! # Example
//!
//! ```
//! use sarsync::{Clock, FixedClock};
//!
//! let clock = FixedClock::new(1_000);
//! assert_eq!(clock.now_millis(), 1_000);
//! clock.advance(500);
//! assert_eq!(clock.now_millis(), 1_500);
//! ```

use std::fmt::Debug;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

/// A time provider for getting the current instant.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as a UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock backed by [`chrono::Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
///
/// Unlike [`SystemClock`] it never moves on its own: every read returns the
/// same instant until [`advance`](FixedClock::advance) or
/// [`set`](FixedClock::set) is called.
pub struct FixedClock {
    millis: Mutex<i64>,
}

impl FixedClock {
    /// Create a clock frozen at the given epoch milliseconds.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Move the clock forward (or backward, with a negative value).
    pub fn advance(&self, ms: i64) {
        *self.lock() += ms;
    }

    /// Jump to a specific epoch millisecond.
    pub fn set(&self, ms: i64) {
        *self.lock() = ms;
    }

    /// Current value in epoch milliseconds.
    pub fn get(&self) -> i64 {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, i64> {
        // The guarded value is a plain integer, so a poisoned lock is still usable.
        self.millis.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.get();
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.get()
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

impl Clone for FixedClock {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &self.get())
            .finish()
    }
}
