//! Event bus that writes every notification to the log.

use tracing::{info, warn};
use webstory_audio::domain::events::AUDIO_WARNING_EVENT_TYPE;
use webstory_core::bus::{EventBus, PublishedEvent};

/// Logs each notification as a structured event. Warnings are logged at
/// `WARN`, everything else at `INFO`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn publish(&self, event: PublishedEvent) {
        if event.event_type == AUDIO_WARNING_EVENT_TYPE {
            warn!(
                event_type = %event.event_type,
                asset_id = %event.asset_id,
                sequence_number = event.sequence_number,
                correlation_id = %event.correlation_id,
                payload = %event.payload,
                "asset notification"
            );
        } else {
            info!(
                event_type = %event.event_type,
                asset_id = %event.asset_id,
                sequence_number = event.sequence_number,
                correlation_id = %event.correlation_id,
                payload = %event.payload,
                "asset notification"
            );
        }
    }
}
