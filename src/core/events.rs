//! Query lifecycle events
//!
//! The synchronizer publishes one event per step of every request cycle on
//! an [`EventBus`]. Views, loggers and tests subscribe to it to observe the
//! engine without reaching into its state.
//!
//! # Architecture
//!
//! ```text
//! FilterStateStore ──notify──▶ QuerySynchronizer ──▶ EventBus::publish() ──▶ subscribers
//!                                     │
//!                                     └──▶ AssetQueryService (spawned)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// One step of a query cycle, tagged with its sequence number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QueryEvent {
    /// A request was issued with the given sequence number
    Issued { sequence: u64 },
    /// The latest request resolved and its items are now displayed
    Applied { sequence: u64, items: usize },
    /// A superseded request resolved and was ignored
    Discarded { sequence: u64, latest: u64 },
    /// The latest request failed
    Failed { sequence: u64, message: String },
}

impl QueryEvent {
    pub fn sequence(&self) -> u64 {
        match self {
            QueryEvent::Issued { sequence }
            | QueryEvent::Applied { sequence, .. }
            | QueryEvent::Discarded { sequence, .. }
            | QueryEvent::Failed { sequence, .. } => *sequence,
        }
    }

    /// Get the action name (issued, applied, discarded, failed)
    pub fn action(&self) -> &str {
        match self {
            QueryEvent::Issued { .. } => "issued",
            QueryEvent::Applied { .. } => "applied",
            QueryEvent::Discarded { .. } => "discarded",
            QueryEvent::Failed { .. } => "failed",
        }
    }
}

/// Envelope wrapping a query event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: QueryEvent,
}

impl EventEnvelope {
    pub fn new(event: QueryEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (Arc internally). Publishing never blocks; subscribers that
/// fall behind receive `Lagged` on their next `recv()`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers that will receive the event.
    pub fn publish(&self, event: QueryEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() returns Err only if there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = QueryEvent::Discarded {
            sequence: 2,
            latest: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "discarded");
        assert_eq!(json["latest"], 3);
        assert_eq!(event.sequence(), 2);
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let receivers = bus.publish(QueryEvent::Issued { sequence: 1 });
        assert_eq!(receivers, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.action(), "issued");
        assert_eq!(received.event.sequence(), 1);
        assert!(!received.id.is_nil());
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(QueryEvent::Issued { sequence: 1 }), 0);
        assert_eq!(bus.receiver_count(), 0);
    }
}
