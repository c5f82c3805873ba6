//! Mock notification channel for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::call_log::{self, CallLog};
use crate::notify::{NotificationChannel, NotifyError, StatusEvent};

/// Mock implementation of the NotificationChannel trait.
///
/// Records every delivered event. Can be told to fail once or always.
#[derive(Debug)]
pub struct MockChannel {
    name: String,
    /// Events delivered successfully.
    events: Arc<RwLock<Vec<StatusEvent>>>,
    /// Number of delivery attempts, including failed ones.
    attempts: Arc<RwLock<usize>>,
    /// If set, the next delivery will fail with this error.
    next_error: Arc<RwLock<Option<NotifyError>>>,
    /// Fail every delivery.
    always_fail: Arc<RwLock<bool>>,
    /// Shared call sequence, if attached.
    call_log: Option<CallLog>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl MockChannel {
    /// Create a channel reporting `name` as its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Arc::new(RwLock::new(Vec::new())),
            attempts: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(false)),
            call_log: None,
        }
    }

    /// Record calls into a shared sequence.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    /// Events delivered so far.
    pub async fn events(&self) -> Vec<StatusEvent> {
        self.events.read().await.clone()
    }

    /// Delivery attempts so far.
    pub async fn attempts(&self) -> usize {
        *self.attempts.read().await
    }

    /// Configure the next delivery to fail with the given error.
    pub async fn set_next_error(&self, error: NotifyError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every delivery fail.
    pub async fn set_always_fail(&self, fail: bool) {
        *self.always_fail.write().await = fail;
    }
}

#[async_trait]
impl NotificationChannel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<(), NotifyError> {
        call_log::record(&self.call_log, "notify").await;
        *self.attempts.write().await += 1;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if *self.always_fail.read().await {
            return Err(NotifyError::Transport("mock channel down".to_string()));
        }

        self.events.write().await.push(event.clone());
        Ok(())
    }
}
