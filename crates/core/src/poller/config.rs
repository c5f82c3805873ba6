//! Poller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Time between ticks (milliseconds).
    /// Independent of how long a cycle takes.
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Skip ticks while the previous cycle is still running.
    #[serde(default = "default_single_flight")]
    pub single_flight: bool,

    /// How long `stop` waits for in-flight cycles (seconds).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_interval() -> u64 {
    5000 // 5 seconds
}

fn default_single_flight() -> bool {
    true
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            single_flight: default_single_flight(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl PollerConfig {
    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn with_shutdown_timeout(mut self, secs: u64) -> Self {
        self.shutdown_timeout_secs = secs;
        self
    }
}
