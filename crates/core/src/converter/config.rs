//! Configuration for the converter module.

use serde::{Deserialize, Serialize};

/// Configuration for the image converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Timeout for a single conversion in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Largest accepted input width or height, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_max_dimension() -> u32 {
    16384
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl ConverterConfig {
    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the maximum accepted input dimension.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}
