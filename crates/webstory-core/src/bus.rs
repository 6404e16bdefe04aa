//! Event bus abstraction.
//!
//! Notifications are fire-and-forget: publishers never consume a return value
//! and nothing on the bus feeds back into control flow.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::event::DomainEvent;

/// Bus representation of a domain event.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Asset this event belongs to.
    pub asset_id: Uuid,
    /// Event type name for routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the asset's event stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl PublishedEvent {
    /// Flattens any domain event into its bus representation.
    #[must_use]
    pub fn from_event(event: &dyn DomainEvent) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            asset_id: meta.asset_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// Sink for asset notifications.
pub trait EventBus: Send + Sync {
    /// Publishes one notification.
    fn publish(&self, event: PublishedEvent);
}

