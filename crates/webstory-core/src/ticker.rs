//! Tick source abstraction.
//!
//! Assets advance on a recurring tick. Production code drives them from a
//! timer; tests advance them by hand.

use async_trait::async_trait;

/// A recurring tick.
#[async_trait]
pub trait Ticker: Send {
    /// Waits until the next tick is due.
    async fn tick(&mut self);

    /// Returns the nominal tick interval in milliseconds.
    fn interval_ms(&self) -> u64;
}
