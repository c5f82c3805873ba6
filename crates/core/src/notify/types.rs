//! Types for the notification module.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::job::Job;

/// Message sent with every successful conversion.
pub const COMPLETED_MESSAGE: &str = "File conversion completed";

/// Terminal outcome of one job attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Completed,
    Failed,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one job attempt, as published to notification channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Owner of the job. Empty when the message could not be parsed.
    pub username: String,
    /// Source file name. Empty when the message could not be parsed.
    pub file_name: String,
    /// Name of the converted artifact (completed only).
    pub output_file: Option<String>,
    pub outcome: JobOutcome,
    /// Public locator of the converted artifact (completed only).
    pub url: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl StatusEvent {
    /// A successful conversion of `job` into `output_file`, reachable at `url`.
    pub fn completed(job: &Job, output_file: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            username: job.username.clone(),
            file_name: job.file_name.clone(),
            output_file: Some(output_file.into()),
            outcome: JobOutcome::Completed,
            url: Some(url.into()),
            message: COMPLETED_MESSAGE.to_string(),
        }
    }

    /// A failed attempt. Never carries a locator.
    pub fn failed(
        username: impl Into<String>,
        file_name: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            username: username.into(),
            file_name: file_name.into(),
            output_file: None,
            outcome: JobOutcome::Failed,
            url: None,
            message: format!("File conversion failed: {}", reason),
        }
    }

    /// Payload for live subscribers.
    pub fn broadcast_payload(&self) -> BroadcastPayload {
        BroadcastPayload {
            message: self.message.clone(),
            file: self
                .output_file
                .clone()
                .unwrap_or_else(|| self.file_name.clone()),
            url: self.url.clone(),
        }
    }

    /// Payload for the upstream coordinator.
    pub fn upstream_status(&self) -> UpstreamStatus {
        UpstreamStatus {
            username: self.username.clone(),
            file_name: self.file_name.clone(),
            status: self.outcome,
            url: self.url.clone(),
            message: self.message.clone(),
        }
    }
}

/// `{message, file, url}` as sent to WebSocket subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPayload {
    pub message: String,
    pub file: String,
    pub url: Option<String>,
}

/// Body of `POST /api/update-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamStatus {
    pub username: String,
    pub file_name: String,
    pub status: JobOutcome,
    pub url: Option<String>,
    pub message: String,
}
