//! Fan-out of status events to every configured channel.

use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

use super::traits::NotificationChannel;
use super::types::StatusEvent;
use crate::metrics::NOTIFICATIONS_TOTAL;

/// Delivery summary of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
    /// Deliveries handed to background tasks; their outcome is only logged.
    pub detached: usize,
}

/// Zero or more notification channels behind a single publish call.
#[derive(Clone, Default)]
pub struct NotificationSink {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl NotificationSink {
    /// Creates a sink with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel.
    pub fn with_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Names of the configured channels.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    /// Delivers `event` to all channels.
    ///
    /// Detached channels are spawned and not awaited. The others are
    /// delivered concurrently before this returns. A failing channel is
    /// logged and counted; it never affects the other channels or the caller.
    pub async fn publish(&self, event: &StatusEvent) -> PublishReport {
        let mut report = PublishReport::default();
        let mut inline = Vec::new();

        for channel in &self.channels {
            if channel.detached() {
                let channel = Arc::clone(channel);
                let event = event.clone();
                tokio::spawn(async move {
                    deliver_one(channel.as_ref(), &event).await;
                });
                report.detached += 1;
            } else {
                inline.push(channel);
            }
        }

        let results = join_all(
            inline
                .into_iter()
                .map(|channel| deliver_one(channel.as_ref(), event)),
        )
        .await;
        for delivered in results {
            if delivered {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }
}

/// Delivers to one channel, logging and counting the outcome.
async fn deliver_one(channel: &dyn NotificationChannel, event: &StatusEvent) -> bool {
    let name = channel.name();
    match channel.deliver(event).await {
        Ok(()) => {
            NOTIFICATIONS_TOTAL
                .with_label_values(&[name, "delivered"])
                .inc();
            true
        }
        Err(e) => {
            NOTIFICATIONS_TOTAL.with_label_values(&[name, "failed"]).inc();
            warn!(
                channel = %name,
                file = %event.file_name,
                outcome = %event.outcome,
                "Failed to deliver status event: {}",
                e
            );
            false
        }
    }
}

impl std::fmt::Debug for NotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSink")
            .field("channels", &self.channel_names())
            .finish()
    }
}
