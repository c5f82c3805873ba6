//! Error types for the processor module.

use thiserror::Error;

use crate::converter::ConverterError;
use crate::job::JobParseError;
use crate::queue::QueueError;
use crate::storage::StorageError;

/// Why a single job attempt failed.
#[derive(Debug, Error)]
pub enum JobError {
    /// The message body is not a valid job.
    #[error("invalid job message: {0}")]
    MessageParse(#[from] JobParseError),

    /// The source object could not be read.
    #[error("failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: StorageError,
    },

    /// Local staging I/O failed (temp dir, writing the fetched stream).
    #[error("failed to stage files: {0}")]
    Stage(#[from] std::io::Error),

    /// The converter rejected or failed the conversion.
    #[error("transform failed: {0}")]
    Transform(#[from] ConverterError),

    /// The converted object could not be written.
    #[error("failed to store {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The attempt exceeded its deadline.
    #[error("job timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl JobError {
    /// Pipeline stage label, used for metrics and logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MessageParse(_) => "parse",
            Self::Fetch { .. } => "fetch",
            Self::Stage(_) => "stage",
            Self::Transform(_) => "transform",
            Self::Store { .. } => "store",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// Returns true if a redelivery of the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MessageParse(_) => false,
            Self::Fetch { source, .. } | Self::Store { source, .. } => source.is_retryable(),
            Self::Stage(_) | Self::Timeout { .. } => true,
            Self::Transform(e) => e.is_retryable(),
        }
    }
}

/// Errors that abort a whole cycle.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("queue receive failed: {0}")]
    QueueReceive(#[from] QueueError),
}
