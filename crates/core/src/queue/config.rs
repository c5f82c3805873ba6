//! Configuration for the queue module.

use serde::{Deserialize, Serialize};

/// SQS queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue URL.
    pub url: String,

    /// Visibility timeout applied to received messages, in seconds.
    /// When unset, the queue's own default applies.
    #[serde(default)]
    pub visibility_timeout_secs: Option<i32>,
}

impl QueueConfig {
    /// Creates a config for the given queue URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            visibility_timeout_secs: None,
        }
    }

    /// Sets the visibility timeout.
    pub fn with_visibility_timeout(mut self, secs: i32) -> Self {
        self.visibility_timeout_secs = Some(secs);
        self
    }

    /// Last path segment of the queue URL.
    pub fn queue_name(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}
