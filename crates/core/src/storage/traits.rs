//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageError;
use super::types::ObjectReader;

/// A blob store holding source and converted objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Opens the object at `key` for streaming reads.
    ///
    /// Fails with [`StorageError::NotFound`] when no such object exists.
    async fn fetch(&self, key: &str) -> Result<ObjectReader, StorageError>;

    /// Writes the file at `path` to `key` with the given content type.
    async fn store(&self, key: &str, path: &Path, content_type: &str)
        -> Result<(), StorageError>;

    /// Public URL under which the object at `key` can be retrieved.
    fn public_url(&self, key: &str) -> String;
}
