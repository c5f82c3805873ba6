use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides, e.g. `MEDIACONV_STORAGE__BUCKET`.
pub const ENV_PREFIX: &str = "MEDIACONV_";

/// Variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "MEDIACONV_CONFIG";

/// Configuration file used when `MEDIACONV_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(prefixed_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from environment variables only.
///
/// Besides the `MEDIACONV_` variables, the plain `SQS_QUEUE_URL`, `S3_BUCKET`
/// and `AWS_REGION` variables are honoured at lower precedence.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(legacy_env())
        .merge(prefixed_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load from `path` when it exists, otherwise from the environment alone.
pub fn load_config_or_env(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        load_config_from_env()
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn prefixed_env() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

fn legacy_env() -> Env {
    Env::raw()
        .only(&["SQS_QUEUE_URL", "S3_BUCKET", "AWS_REGION"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "sqs_queue_url" => "queue.url".into(),
            "s3_bucket" => "storage.bucket".into(),
            "aws_region" => "aws.region".into(),
            _ => key.into(),
        })
}
