//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest batch a single receive may request.
pub const MAX_MESSAGES_LIMIT: i32 = 10;

/// Longest long-poll wait the queue accepts, in seconds.
pub const MAX_WAIT_TIME_SECONDS: i32 = 20;

/// What happens to the message of a job that failed after parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the message on the queue; it reappears after the visibility timeout.
    #[default]
    Retain,
    /// Delete the message; the failure is final.
    Acknowledge,
}

/// What happens to a message whose body cannot be parsed into a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoisonPolicy {
    /// Delete the message.
    #[default]
    Discard,
    /// Leave the message on the queue (e.g. for a dead-letter redrive policy).
    Retain,
}

/// Configuration for the job processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Messages requested per receive (clamped to 1..=10).
    #[serde(default = "default_max_messages")]
    pub max_messages: i32,

    /// Long-poll wait per receive in seconds (clamped to 0..=20).
    #[serde(default = "default_wait_time")]
    pub wait_time_seconds: i32,

    /// Acknowledgement of failed jobs.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Acknowledgement of unparseable messages.
    #[serde(default)]
    pub poison_policy: PoisonPolicy,

    /// Parent of the per-attempt staging directories.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Deadline for a whole attempt (fetch through store), in seconds.
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
}

fn default_max_messages() -> i32 {
    1
}

fn default_wait_time() -> i32 {
    20
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("mediaconv")
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            wait_time_seconds: default_wait_time(),
            failure_policy: FailurePolicy::default(),
            poison_policy: PoisonPolicy::default(),
            temp_dir: default_temp_dir(),
            job_timeout_secs: None,
        }
    }
}

impl ProcessorConfig {
    /// Batch size actually requested from the queue.
    pub fn effective_max_messages(&self) -> i32 {
        self.max_messages.clamp(1, MAX_MESSAGES_LIMIT)
    }

    /// Long-poll wait actually requested from the queue.
    pub fn effective_wait_time_seconds(&self) -> i32 {
        self.wait_time_seconds.clamp(0, MAX_WAIT_TIME_SECONDS)
    }

    pub fn with_max_messages(mut self, max: i32) -> Self {
        self.max_messages = max;
        self
    }

    pub fn with_wait_time(mut self, seconds: i32) -> Self {
        self.wait_time_seconds = seconds;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_poison_policy(mut self, policy: PoisonPolicy) -> Self {
        self.poison_policy = policy;
        self
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Sets the per-attempt deadline.
    pub fn with_job_timeout(mut self, secs: u64) -> Self {
        self.job_timeout_secs = Some(secs);
        self
    }
}
