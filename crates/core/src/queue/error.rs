//! Error types for the queue module.

use thiserror::Error;

/// Errors that can occur while talking to the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The receive call itself failed.
    #[error("failed to receive messages: {0}")]
    Receive(String),

    /// Deleting a message failed.
    #[error("failed to acknowledge message: {0}")]
    Acknowledge(String),
}

impl QueueError {
    /// Creates a new receive error.
    pub fn receive(reason: impl Into<String>) -> Self {
        Self::Receive(reason.into())
    }

    /// Creates a new acknowledge error.
    pub fn acknowledge(reason: impl Into<String>) -> Self {
        Self::Acknowledge(reason.into())
    }
}
