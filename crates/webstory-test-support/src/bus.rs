//! Test bus — records every published notification.

use std::sync::Mutex;

use webstory_core::bus::{EventBus, PublishedEvent};

/// An event bus that keeps every notification in publication order.
#[derive(Debug, Default)]
pub struct RecordingEventBus {
    published: Mutex<Vec<PublishedEvent>>,
}

impl RecordingEventBus {
    /// Create an empty recording bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all published notifications.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the event types in publication order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn event_types(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    /// Returns the notifications of one event type.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events_of_type(&self, event_type: &str) -> Vec<PublishedEvent> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Forgets everything recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: PublishedEvent) {
        self.published.lock().unwrap().push(event);
    }
}
