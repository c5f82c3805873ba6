//! Types for the queue module.

use serde::{Deserialize, Serialize};

/// One message received from the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Queue-assigned message id, when the backend provides one.
    pub message_id: Option<String>,
    /// Raw message body (a serialized job).
    pub body: String,
    /// Opaque token used to acknowledge this delivery.
    pub receipt: String,
    /// How many times this message has been delivered, including this one.
    pub receive_count: u32,
}

impl QueueMessage {
    /// Creates a first-delivery message.
    pub fn new(body: impl Into<String>, receipt: impl Into<String>) -> Self {
        Self {
            message_id: None,
            body: body.into(),
            receipt: receipt.into(),
            receive_count: 1,
        }
    }

    /// Sets the message id.
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Identifier suitable for logs: the message id, or the receipt.
    pub fn log_id(&self) -> &str {
        self.message_id.as_deref().unwrap_or(&self.receipt)
    }
}
