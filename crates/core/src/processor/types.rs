//! Types for the processor module.

use serde::{Deserialize, Serialize};

use crate::notify::JobOutcome;

/// How one received message was handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Queue message ID, when the queue provided one.
    pub message_id: Option<String>,
    /// Owner of the job ("" when the body could not be read).
    pub username: String,
    /// Source file name ("" when the body could not be read).
    pub file_name: String,
    pub outcome: JobOutcome,
    /// Key the converted object was stored under.
    pub output_key: Option<String>,
    /// Public locator of the converted object.
    pub url: Option<String>,
    /// Failure reason.
    pub error: Option<String>,
    /// Whether the message was deleted from the queue.
    pub acknowledged: bool,
}

/// Summary of one polling cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleReport {
    /// Messages received.
    pub received: usize,
    /// Jobs that completed.
    pub completed: usize,
    /// Jobs that failed (including unparseable messages).
    pub failed: usize,
    /// Messages acknowledged.
    pub acknowledged: usize,
    /// One entry per received message, in receive order.
    pub attempts: Vec<AttemptReport>,
}

impl CycleReport {
    /// A cycle in which the queue had nothing to deliver.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.received == 0
    }

    pub(crate) fn record(&mut self, attempt: AttemptReport) {
        match attempt.outcome {
            JobOutcome::Completed => self.completed += 1,
            JobOutcome::Failed => self.failed += 1,
        }
        if attempt.acknowledged {
            self.acknowledged += 1;
        }
        self.attempts.push(attempt);
    }
}

/// Running statistics of a processor since startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorStatus {
    /// Cycles started.
    pub cycles: u64,
    /// Cycles that received nothing.
    pub idle_cycles: u64,
    /// Cycles aborted by a receive error.
    pub receive_errors: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub messages_acknowledged: u64,
    pub acknowledge_failures: u64,
    /// Most recent receive or job error.
    pub last_error: Option<String>,
}
