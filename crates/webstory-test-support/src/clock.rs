//! Frozen clock, so recorded notifications carry predictable timestamps.

use chrono::{DateTime, Utc};
use webstory_core::clock::Clock;

/// Stamps every notification with the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
