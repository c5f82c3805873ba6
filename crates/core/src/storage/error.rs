//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists under the key.
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Reading an object failed.
    #[error("Fetch of {key} failed: {reason}")]
    FetchFailed { key: String, reason: String },

    /// Writing an object failed.
    #[error("Store of {key} failed: {reason}")]
    StoreFailed { key: String, reason: String },

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a fetch failure.
    pub fn fetch_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a store failure.
    pub fn store_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}
