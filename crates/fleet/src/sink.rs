//! Event sinks
//!
//! The ingestion service hands every [`MonitorEvent`] to an [`EventSink`].
//! [`BroadcastSink`] fans events out to any number of subscribers over a
//! `tokio::sync::broadcast` channel.

use bridgewatch_signal::MonitorEvent;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel
pub const DEFAULT_EVENT_BUFFER: usize = 1000;

/// Destination for monitor events. Publishing must not block.
pub trait EventSink: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: MonitorEvent);
}

/// In-process fan-out sink
///
/// When the buffer is full the oldest unread events are dropped and slow
/// receivers observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<MonitorEvent>,
}

impl BroadcastSink {
    /// Create a sink with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: MonitorEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }
}
