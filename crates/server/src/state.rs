use std::sync::Arc;

use mediaconv_core::{BroadcastChannel, Config, JobProcessor, Poller, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    poller: Arc<Poller>,
    broadcast: Option<BroadcastChannel>,
}

impl AppState {
    pub fn new(config: Config, poller: Arc<Poller>, broadcast: Option<BroadcastChannel>) -> Self {
        Self {
            config,
            poller,
            broadcast,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.poller
    }

    pub fn processor(&self) -> &Arc<JobProcessor> {
        self.poller.processor()
    }

    /// Live subscriber channel, absent when broadcast is disabled.
    pub fn broadcast(&self) -> Option<&BroadcastChannel> {
        self.broadcast.as_ref()
    }
}
