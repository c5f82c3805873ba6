//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::RwLock;

use super::call_log::{self, CallLog};
use crate::storage::{s3_public_url, ObjectReader, ObjectStore, StorageError};

/// A recorded `store` call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Mock implementation of the ObjectStore trait.
///
/// Keeps objects in memory and builds locators the same way as the S3 store,
/// for the configured bucket and region.
#[derive(Debug)]
pub struct MockObjectStore {
    bucket: String,
    region: String,
    /// Object contents by key.
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Keys passed to `fetch`, in order.
    fetches: Arc<RwLock<Vec<String>>>,
    /// Successful `store` calls, in order.
    stores: Arc<RwLock<Vec<StoredObject>>>,
    /// Keys whose body breaks off after the stored bytes.
    broken: Arc<RwLock<HashSet<String>>>,
    /// If set, the next fetch will fail with this error.
    next_fetch_error: Arc<RwLock<Option<StorageError>>>,
    /// If set, the next store will fail with this error.
    next_store_error: Arc<RwLock<Option<StorageError>>>,
    /// Shared call sequence, if attached.
    call_log: Option<CallLog>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    /// Create an empty store for bucket "mock-bucket" in us-east-1.
    pub fn new() -> Self {
        Self::with_location("mock-bucket", "us-east-1")
    }

    /// Create an empty store whose locators use `bucket` and `region`.
    pub fn with_location(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            objects: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            stores: Arc::new(RwLock::new(Vec::new())),
            broken: Arc::new(RwLock::new(HashSet::new())),
            next_fetch_error: Arc::new(RwLock::new(None)),
            next_store_error: Arc::new(RwLock::new(None)),
            call_log: None,
        }
    }

    /// Record calls into a shared sequence.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    /// Put an object directly.
    pub async fn put_object(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.write().await.insert(key.into(), bytes.into());
    }

    /// Contents of an object, if present.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    /// Keys fetched so far.
    pub async fn fetched_keys(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }

    /// Objects stored so far.
    pub async fn stored_objects(&self) -> Vec<StoredObject> {
        self.stores.read().await.clone()
    }

    /// Seed an object whose body errors once `bytes` have been read.
    pub async fn put_broken_object(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let key = key.into();
        self.broken.write().await.insert(key.clone());
        self.objects.write().await.insert(key, bytes.into());
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_fetch_error(&self, error: StorageError) {
        *self.next_fetch_error.write().await = Some(error);
    }

    /// Configure the next store to fail with the given error.
    pub async fn set_next_store_error(&self, error: StorageError) {
        *self.next_store_error.write().await = Some(error);
    }
}

/// Body tail that fails like a dropped connection.
struct BrokenBody;

impl AsyncRead for BrokenBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset while reading body",
        )))
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, key: &str) -> Result<ObjectReader, StorageError> {
        call_log::record(&self.call_log, "fetch").await;
        self.fetches.write().await.push(key.to_string());

        if let Some(err) = self.next_fetch_error.write().await.take() {
            return Err(err);
        }

        match self.objects.read().await.get(key) {
            Some(bytes) if self.broken.read().await.contains(key) => {
                Ok(Box::pin(Cursor::new(bytes.clone()).chain(BrokenBody)))
            }
            Some(bytes) => Ok(Box::pin(Cursor::new(bytes.clone()))),
            None => Err(StorageError::not_found(key)),
        }
    }

    async fn store(&self, key: &str, path: &Path, content_type: &str) -> Result<(), StorageError> {
        call_log::record(&self.call_log, "store").await;

        if let Some(err) = self.next_store_error.write().await.take() {
            return Err(err);
        }

        let bytes = tokio::fs::read(path).await?;
        self.stores.write().await.push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size_bytes: bytes.len() as u64,
        });
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        s3_public_url(&self.bucket, &self.region, key)
    }
}
