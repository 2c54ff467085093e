//! Post-save announcement of catalog domain events.
//!
//! Events queued by an aggregate are drained only after `save_changes`
//! succeeds, wrapped in envelopes and published on the bus. Announcement is
//! best effort: the documents are already committed, so a publish failure is
//! logged and swallowed rather than bubbled up to the caller.

use std::thread::{self, JoinHandle};

use serde_json::Value as JsonValue;
use tracing::{info, warn};
use uuid::Uuid;

use shopforge_catalog::CatalogEvent;
use shopforge_events::{Event, EventBus, EventEnvelope};

/// Envelope shape used for every catalog announcement. Payloads are carried
/// as JSON so subscribers do not need the domain types on their side.
pub type CatalogEnvelope = EventEnvelope<JsonValue>;

/// Publish drained events on the bus, one envelope per event.
///
/// `first_sequence` is the revision the save just produced; when a single
/// save drained several events they are numbered consecutively from there.
pub fn announce_catalog_events<B>(
    bus: &B,
    aggregate_type: &str,
    aggregate_id: Uuid,
    first_sequence: u64,
    events: Vec<CatalogEvent>,
) where
    B: EventBus<CatalogEnvelope>,
{
    for (offset, event) in events.into_iter().enumerate() {
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    event_type = event.event_type(),
                    aggregate_id = %aggregate_id,
                    error = %err,
                    "failed to serialize event payload, skipping announcement"
                );
                continue;
            }
        };
        let envelope = CatalogEnvelope::new(
            Uuid::now_v7(),
            aggregate_id,
            aggregate_type,
            first_sequence + offset as u64,
            payload,
        );
        if let Err(err) = bus.publish(envelope) {
            warn!(
                event_type = event.event_type(),
                aggregate_id = %aggregate_id,
                error = ?err,
                "failed to announce event"
            );
        }
    }
}

/// Subscribe to the bus and log every announcement until the bus is dropped.
///
/// This is the notification side of product creation: storefront caches,
/// search indexers and the like hang off the same subscription point.
pub fn spawn_logging_subscriber<B>(bus: &B) -> JoinHandle<()>
where
    B: EventBus<CatalogEnvelope>,
{
    let subscription = bus.subscribe();
    thread::spawn(move || {
        while let Ok(envelope) = subscription.recv() {
            // Externally tagged payloads carry the event name as the sole key.
            let (event, body) = envelope
                .payload()
                .as_object()
                .and_then(|map| map.iter().next())
                .map(|(name, body)| (name.as_str(), body))
                .unwrap_or(("unknown", envelope.payload()));
            let occurred_at = body
                .get("occurred_at")
                .and_then(JsonValue::as_str)
                .unwrap_or("");
            info!(
                event,
                aggregate_type = envelope.aggregate_type(),
                aggregate_id = %envelope.aggregate_id(),
                sequence = envelope.sequence_number(),
                occurred_at,
                "catalog event announced"
            );
        }
    })
}
