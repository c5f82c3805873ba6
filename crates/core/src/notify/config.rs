//! Configuration for the notification module.

use serde::{Deserialize, Serialize};

/// Which channels receive status events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Upstream coordinator; disabled when absent.
    #[serde(default)]
    pub upstream: Option<UpstreamConfig>,
}

/// Live subscriber broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Events buffered per subscriber before it starts lagging.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    256
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_capacity(),
        }
    }
}

/// Upstream coordinator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the coordinator (e.g. "http://uploader:3000").
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

impl UpstreamConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Full URL of the status endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/api/update-status", self.url.trim_end_matches('/'))
    }
}
