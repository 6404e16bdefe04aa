//! Shared test fakes and utilities for the WebStory playback engine.

mod bus;
mod clock;
mod resource;
mod store;
mod ticker;

pub use bus::RecordingEventBus;
pub use clock::FixedClock;
pub use resource::{FakeResource, FakeResourceFactory, TransportCall};
pub use store::{FailingSnapshotStore, InMemorySnapshotStore};
pub use ticker::ManualTicker;
