//! Trait definitions for the notification module.

use async_trait::async_trait;

use super::error::NotifyError;
use super::types::StatusEvent;

/// One destination for job status events.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Returns the name of this channel, used in logs and metrics.
    fn name(&self) -> &str;

    /// Delivers one event. Implementations must not retry.
    async fn deliver(&self, event: &StatusEvent) -> Result<(), NotifyError>;

    /// Whether delivery runs in the background instead of inside `publish`.
    ///
    /// Remote channels return `true` so an unavailable endpoint cannot hold
    /// back acknowledgement of the job.
    fn detached(&self) -> bool {
        false
    }
}
