//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single conversion request on staged files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Identifier used in logs (typically the queue message id).
    pub job_id: String,
    /// Staged source file.
    pub input_path: PathBuf,
    /// Where the converted file must be written.
    pub output_path: PathBuf,
    /// Requested output format token (e.g. "png").
    pub format: String,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Identifier of the job this result belongs to.
    pub job_id: String,
    /// Path of the converted file.
    pub output_path: PathBuf,
    /// Size of the converted file in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock conversion time in milliseconds.
    pub duration_ms: u64,
    /// Detected input format, when the converter could identify it.
    pub input_format: Option<String>,
    /// Produced output format.
    pub output_format: String,
    /// MIME type of the converted file.
    pub content_type: String,
}
