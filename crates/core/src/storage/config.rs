//! Configuration for the storage module.

use serde::{Deserialize, Serialize};

/// Object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding both source and converted objects.
    pub bucket: String,

    /// Base URL for public locators. When unset, the virtual-hosted
    /// S3 form `https://{bucket}.s3.{region}.amazonaws.com` is used.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Creates a config for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_base_url: None,
        }
    }

    /// Sets the public base URL.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }
}
