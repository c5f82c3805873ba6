//! S3-backed object store.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::{debug, info};

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::ObjectStore;
use super::types::{public_url, ObjectReader};

/// Object store on an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    config: StorageConfig,
    region: String,
}

impl S3ObjectStore {
    /// Creates a store around an existing S3 client.
    ///
    /// `region` is only used to build public locators.
    pub fn new(client: Client, config: StorageConfig, region: impl Into<String>) -> Self {
        Self {
            client,
            config,
            region: region.into(),
        }
    }

    /// Creates a store from shared AWS configuration.
    ///
    /// Path-style addressing is forced when a custom endpoint is configured,
    /// which S3-compatible backends generally require.
    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        config: StorageConfig,
        region: impl Into<String>,
    ) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(sdk_config.endpoint_url().is_some())
            .build();
        Self::new(Client::from_conf(s3_config), config, region)
    }

    /// Bucket this store reads from and writes to.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn fetch(&self, key: &str) -> Result<ObjectReader, StorageError> {
        debug!("Fetching s3://{}/{}", self.config.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if not_found {
                    StorageError::not_found(key)
                } else {
                    StorageError::fetch_failed(key, e.to_string())
                }
            })?;

        Ok(Box::pin(response.body.into_async_read()))
    }

    async fn store(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::store_failed(key, e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::store_failed(key, e.to_string()))?;

        info!("Stored {} to s3://{}/{}", path.display(), self.config.bucket, key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(
            &self.config.bucket,
            &self.region,
            self.config.public_base_url.as_deref(),
            key,
        )
    }
}
