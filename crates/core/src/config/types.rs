use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::converter::ConverterConfig;
use crate::notify::NotifierConfig;
use crate::poller::PollerConfig;
use crate::processor::{FailurePolicy, PoisonPolicy, ProcessorConfig};
use crate::queue::QueueConfig;
use crate::storage::StorageConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    pub queue: QueueConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// AWS client configuration shared by the queue and storage clients.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AwsConfig {
    /// Region of the bucket and queue (e.g. "us-east-1").
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3/SQS-compatible services (e.g. LocalStack).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Named profile from the shared AWS config files.
    #[serde(default)]
    pub profile: Option<String>,
}

/// Sanitized config for API responses (queue account and credentials redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub aws: SanitizedAwsConfig,
    pub queue: SanitizedQueueConfig,
    pub storage: StorageConfig,
    pub converter: ConverterConfig,
    pub notifier: SanitizedNotifierConfig,
    pub processor: SanitizedProcessorConfig,
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAwsConfig {
    pub region: Option<String>,
    pub custom_endpoint: bool,
    pub profile_configured: bool,
}

/// Queue config showing only the queue name
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQueueConfig {
    pub name: String,
    pub visibility_timeout_secs: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifierConfig {
    pub broadcast_enabled: bool,
    pub broadcast_capacity: usize,
    /// Upstream URL without userinfo, query or fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProcessorConfig {
    pub max_messages: i32,
    pub wait_time_seconds: i32,
    pub failure_policy: FailurePolicy,
    pub poison_policy: PoisonPolicy,
    pub job_timeout_secs: Option<u64>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            aws: SanitizedAwsConfig {
                region: config.aws.region.clone(),
                custom_endpoint: config.aws.endpoint_url.is_some(),
                profile_configured: config.aws.profile.is_some(),
            },
            queue: SanitizedQueueConfig {
                name: config.queue.queue_name().to_string(),
                visibility_timeout_secs: config.queue.visibility_timeout_secs,
            },
            storage: config.storage.clone(),
            converter: config.converter.clone(),
            notifier: SanitizedNotifierConfig {
                broadcast_enabled: config.notifier.broadcast.enabled,
                broadcast_capacity: config.notifier.broadcast.capacity,
                upstream_url: config
                    .notifier
                    .upstream
                    .as_ref()
                    .map(|u| redact_url(&u.url)),
                upstream_timeout_secs: config.notifier.upstream.as_ref().map(|u| u.timeout_secs),
            },
            processor: SanitizedProcessorConfig {
                max_messages: config.processor.effective_max_messages(),
                wait_time_seconds: config.processor.effective_wait_time_seconds(),
                failure_policy: config.processor.failure_policy,
                poison_policy: config.processor.poison_policy,
                job_timeout_secs: config.processor.job_timeout_secs,
            },
            poller: config.poller.clone(),
        }
    }
}

/// Strips userinfo, query and fragment from a URL.
fn redact_url(raw: &str) -> String {
    match reqwest::Url::parse(raw) {
        Ok(mut url) => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => "<invalid>".to_string(),
    }
}
