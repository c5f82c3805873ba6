//! Shared AWS SDK configuration for the queue and storage clients.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::config::AwsConfig;

/// Loads SDK configuration from the default provider chain, applying the
/// configured region, endpoint and profile on top.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    // Custom endpoint (LocalStack, MinIO, ...)
    if let Some(endpoint) = &config.endpoint_url {
        info!(endpoint = %endpoint, "Using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

/// Region used for public locators: the configured one, else the SDK's.
pub fn resolve_region(config: &AwsConfig, sdk_config: &SdkConfig) -> Option<String> {
    config
        .region
        .clone()
        .or_else(|| sdk_config.region().map(|r| r.to_string()))
}
