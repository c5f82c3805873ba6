//! Trait definitions for the queue module.

use async_trait::async_trait;

use super::error::QueueError;
use super::types::QueueMessage;

/// A message queue that delivers job descriptions.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Returns the name of this queue implementation.
    fn name(&self) -> &str;

    /// Receives up to `max_messages` messages, waiting at most
    /// `wait_time_seconds` for at least one to arrive.
    ///
    /// An empty vector means the wait elapsed with nothing to do.
    async fn receive(
        &self,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Removes a message from the queue so it is never redelivered.
    async fn acknowledge(&self, receipt: &str) -> Result<(), QueueError>;
}
