//! Test ticker — a tick source that never waits.

use async_trait::async_trait;
use webstory_core::ticker::Ticker;

/// A ticker that returns immediately and counts how often it was awaited.
#[derive(Debug, Clone, Copy)]
pub struct ManualTicker {
    interval_ms: u64,
    ticks: u64,
}

impl ManualTicker {
    /// Create a ticker reporting `interval_ms` as its nominal interval.
    #[must_use]
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            ticks: 0,
        }
    }

    /// Returns how many ticks have elapsed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        self.ticks += 1;
    }

    fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
