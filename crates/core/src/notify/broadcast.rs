//! Broadcast channel for live subscribers.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::NotifyError;
use super::traits::NotificationChannel;
use super::types::{BroadcastPayload, StatusEvent};

/// Fire-and-forget fan-out to currently connected subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    sender: broadcast::Sender<BroadcastPayload>,
}

impl BroadcastChannel {
    /// Create a new channel with the given per-subscriber capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to receive payloads.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastPayload> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl NotificationChannel for BroadcastChannel {
    fn name(&self) -> &str {
        "broadcast"
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<(), NotifyError> {
        // A send error only means nobody is listening.
        match self.sender.send(event.broadcast_payload()) {
            Ok(n) => debug!("Broadcast status event to {} subscribers", n),
            Err(_) => debug!("No subscribers for status event"),
        }
        Ok(())
    }
}
