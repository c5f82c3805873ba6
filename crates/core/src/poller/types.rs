//! Types for the poller.

use serde::{Deserialize, Serialize};

/// Current status of the poller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollerStatus {
    /// Whether the loop is running.
    pub running: bool,
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
    /// Ticks observed since start.
    pub ticks: u64,
    /// Ticks skipped because a cycle was still in flight.
    pub skipped_ticks: u64,
    /// Cycles currently running.
    pub in_flight: usize,
}
