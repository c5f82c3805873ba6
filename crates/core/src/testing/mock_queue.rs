//! Mock job queue for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::call_log::{self, CallLog};
use crate::queue::{JobQueue, QueueError, QueueMessage};

/// One recorded `receive` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveCall {
    pub max_messages: i32,
    pub wait_time_seconds: i32,
}

/// Mock implementation of the JobQueue trait.
///
/// Messages are delivered in push order. Acknowledged receipts are recorded
/// so tests can assert on the acknowledgement protocol.
///
/// # Example
///
/// ```rust,ignore
/// use mediaconv_core::testing::MockJobQueue;
///
/// let queue = MockJobQueue::new();
/// let receipt = queue.push_body(r#"{"username":"alice","fileName":"a.bmp","format":"png"}"#).await;
///
/// // ... run a cycle ...
///
/// assert_eq!(queue.acknowledged().await, vec![receipt]);
/// ```
#[derive(Debug, Default)]
pub struct MockJobQueue {
    /// Messages waiting to be received.
    pending: Arc<RwLock<VecDeque<QueueMessage>>>,
    /// Receipts passed to `acknowledge` that succeeded.
    acknowledged: Arc<RwLock<Vec<String>>>,
    /// Parameters of every receive call.
    receive_calls: Arc<RwLock<Vec<ReceiveCall>>>,
    /// If set, the next receive will fail with this error.
    next_receive_error: Arc<RwLock<Option<QueueError>>>,
    /// If set, the next acknowledge will fail with this error.
    next_ack_error: Arc<RwLock<Option<QueueError>>>,
    /// Simulated long-poll duration.
    receive_delay: Arc<RwLock<Option<Duration>>>,
    counter: AtomicU64,
    /// Shared call sequence, if attached.
    call_log: Option<CallLog>,
}

impl MockJobQueue {
    /// Create a new empty mock queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into a shared sequence.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    /// Enqueue a prepared message.
    pub async fn push_message(&self, message: QueueMessage) {
        self.pending.write().await.push_back(message);
    }

    /// Enqueue a message with the given body. Returns its receipt.
    pub async fn push_body(&self, body: impl Into<String>) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let receipt = format!("receipt-{}", n);
        let message = QueueMessage::new(body, receipt.clone()).with_message_id(format!("msg-{}", n));
        self.push_message(message).await;
        receipt
    }

    /// Number of messages not yet received.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Receipts acknowledged so far, in order.
    pub async fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.read().await.clone()
    }

    /// All receive calls so far.
    pub async fn receive_calls(&self) -> Vec<ReceiveCall> {
        self.receive_calls.read().await.clone()
    }

    /// Configure the next receive to fail with the given error.
    pub async fn set_next_receive_error(&self, error: QueueError) {
        *self.next_receive_error.write().await = Some(error);
    }

    /// Configure the next acknowledge to fail with the given error.
    pub async fn set_next_ack_error(&self, error: QueueError) {
        *self.next_ack_error.write().await = Some(error);
    }

    /// Make every receive take at least `delay`.
    pub async fn set_receive_delay(&self, delay: Duration) {
        *self.receive_delay.write().await = Some(delay);
    }
}

#[async_trait]
impl JobQueue for MockJobQueue {
    fn name(&self) -> &str {
        "mock"
    }

    async fn receive(
        &self,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        self.receive_calls.write().await.push(ReceiveCall {
            max_messages,
            wait_time_seconds,
        });

        let delay = *self.receive_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_receive_error.write().await.take() {
            return Err(err);
        }

        let mut pending = self.pending.write().await;
        let take = (max_messages.max(0) as usize).min(pending.len());
        Ok(pending
            .drain(..take)
            .map(|mut message| {
                message.receive_count += 1;
                message
            })
            .collect())
    }

    async fn acknowledge(&self, receipt: &str) -> Result<(), QueueError> {
        call_log::record(&self.call_log, "ack").await;

        if let Some(err) = self.next_ack_error.write().await.take() {
            return Err(err);
        }
        self.acknowledged.write().await.push(receipt.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receive_respects_max_messages() {
        let queue = MockJobQueue::new();
        queue.push_body("a").await;
        queue.push_body("b").await;
        queue.push_body("c").await;

        let first = queue.receive(2, 0).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].body, "a");
        assert_eq!(first[0].receive_count, 1);
        assert_eq!(queue.pending_count().await, 1);

        let calls = queue.receive_calls().await;
        assert_eq!(calls[0].max_messages, 2);
    }

    #[tokio::test]
    async fn test_next_errors_are_one_shot() {
        let queue = MockJobQueue::new();
        queue
            .set_next_receive_error(QueueError::receive("boom"))
            .await;
        assert!(queue.receive(1, 0).await.is_err());
        assert!(queue.receive(1, 0).await.unwrap().is_empty());

        queue.set_next_ack_error(QueueError::acknowledge("gone")).await;
        assert!(queue.acknowledge("r-1").await.is_err());
        queue.acknowledge("r-1").await.unwrap();
        assert_eq!(queue.acknowledged().await, vec!["r-1".to_string()]);
    }
}
