//! Wall-clock source for notification timestamps.
//!
//! Playback timing never reads this clock; fades and the queue advance on
//! ticks alone.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time, used to timestamp notifications.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
