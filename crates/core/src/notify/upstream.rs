//! Upstream coordinator channel.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::config::UpstreamConfig;
use super::error::NotifyError;
use super::traits::NotificationChannel;
use super::types::StatusEvent;

/// Reports job outcomes to the coordinating service over HTTP.
#[derive(Debug, Clone)]
pub struct UpstreamChannel {
    client: reqwest::Client,
    endpoint: String,
}

impl UpstreamChannel {
    /// Creates a channel for the configured coordinator.
    pub fn new(config: &UpstreamConfig) -> Result<Self, NotifyError> {
        let endpoint = config.endpoint();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| NotifyError::Config(format!("invalid upstream url: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Full URL events are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationChannel for UpstreamChannel {
    fn name(&self) -> &str {
        "upstream"
    }

    fn detached(&self) -> bool {
        true
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&event.upstream_status())
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!("Upstream acknowledged status for {}", event.file_name);
        Ok(())
    }
}
