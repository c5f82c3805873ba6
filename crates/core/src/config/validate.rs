use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Queue URL and bucket are not empty
/// - A configured region is not blank (an absent one is resolved by the SDK)
/// - Poll interval is not 0
/// - Upstream URL parses, when configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.queue.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.url cannot be empty".to_string(),
        ));
    }

    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket cannot be empty".to_string(),
        ));
    }

    if let Some(region) = config.aws.region.as_deref() {
        if region.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "aws.region cannot be blank".to_string(),
            ));
        }
    }

    if config.poller.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "poller.interval_ms cannot be 0".to_string(),
        ));
    }

    if let Some(upstream) = &config.notifier.upstream {
        if let Err(e) = reqwest::Url::parse(&upstream.url) {
            return Err(ConfigError::ValidationError(format!(
                "notifier.upstream.url is invalid: {}",
                e
            )));
        }
    }

    Ok(())
}
