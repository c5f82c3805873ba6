//! Ordered record of adapter calls shared between mocks.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared call sequence.
///
/// Hand the same log to several mocks with their `with_call_log` builders to
/// assert on the order of calls across adapters. Entries are `"fetch"`,
/// `"convert"`, `"store"`, `"notify"` and `"ack"`.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<RwLock<Vec<&'static str>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one call.
    pub async fn record(&self, call: &'static str) {
        self.entries.write().await.push(call);
    }

    /// Calls recorded so far, in order.
    pub async fn entries(&self) -> Vec<&'static str> {
        self.entries.read().await.clone()
    }
}

/// Records into an optional log.
pub(crate) async fn record(log: &Option<CallLog>, call: &'static str) {
    if let Some(log) = log {
        log.record(call).await;
    }
}
