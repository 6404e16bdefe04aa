//! Tick driving.
//!
//! An asset only advances when it is ticked. [`IntervalTicker`] produces
//! ticks from a tokio timer; the `run_*` helpers pump an asset from any
//! [`Ticker`], which lets tests drive the same loop without waiting.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::debug;
use webstory_core::ticker::Ticker;

use crate::domain::asset::AudioAsset;

/// A ticker backed by `tokio::time::Interval`.
///
/// Late ticks are delayed rather than bunched up, so a stalled host never
/// replays a burst of fade steps at once.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
    interval_ms: u64,
}

impl IntervalTicker {
    /// Creates a ticker firing every `interval_ms` (at least 1 ms).
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(interval_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        let mut interval = interval(Duration::from_millis(interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            interval_ms,
        }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }

    fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

/// Ticks `asset` exactly `ticks` times.
pub async fn run_ticks(asset: &mut AudioAsset, ticker: &mut dyn Ticker, ticks: u64) {
    for _ in 0..ticks {
        ticker.tick().await;
        asset.tick();
    }
}

/// Ticks `asset` until its queue drains, for at most `max_ticks` ticks.
/// Returns the number of ticks taken.
pub async fn run_until_idle(asset: &mut AudioAsset, ticker: &mut dyn Ticker, max_ticks: u64) -> u64 {
    let mut taken = 0;
    while asset.pending_operations() > 0 && taken < max_ticks {
        ticker.tick().await;
        asset.tick();
        taken += 1;
    }
    if asset.pending_operations() > 0 {
        debug!(asset = %asset.name(), taken, pending = asset.pending_operations(), "tick budget exhausted");
    }
    taken
}
