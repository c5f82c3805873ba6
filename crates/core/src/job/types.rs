//! Job types and object key derivation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a queue message body into a [`Job`].
#[derive(Debug, Error)]
pub enum JobParseError {
    /// The body is not valid JSON or misses a required field.
    #[error("malformed job body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field is present but empty.
    #[error("job field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    /// The requested output format is not a plain extension token.
    #[error("invalid output format token: {format}")]
    InvalidFormat { format: String },
}

/// A conversion job parsed from one queue message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Owner of the source object; namespaces both input and output keys.
    pub username: String,
    /// Name of the source object within the owner's namespace.
    pub file_name: String,
    /// Requested output format token (e.g. "png", "webp").
    pub format: String,
    /// Explicit input object key, overriding `{username}/{fileName}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
}

impl Job {
    /// Parses and validates a queue message body.
    pub fn parse(body: &str) -> Result<Self, JobParseError> {
        let mut job: Job = serde_json::from_str(body)?;

        job.username = job.username.trim().to_string();
        job.file_name = job.file_name.trim().to_string();
        job.format = job.format.trim().to_string();
        job.s3_key = job
            .s3_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if job.username.is_empty() {
            return Err(JobParseError::EmptyField { field: "username" });
        }
        if job.file_name.is_empty() {
            return Err(JobParseError::EmptyField { field: "fileName" });
        }
        if job.format.is_empty() {
            return Err(JobParseError::EmptyField { field: "format" });
        }
        if !job.format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(JobParseError::InvalidFormat {
                format: job.format.clone(),
            });
        }

        Ok(job)
    }

    /// Key of the source object in the bucket.
    pub fn input_key(&self) -> String {
        match &self.s3_key {
            Some(key) => key.clone(),
            None => format!("{}/{}", self.username, self.file_name),
        }
    }

    /// Name of the converted artifact generated at `timestamp_ms`.
    pub fn output_file_name(&self, timestamp_ms: i64) -> String {
        format!("converted-{}.{}", timestamp_ms, self.format)
    }

    /// Key of the converted artifact, always under the owner's namespace.
    pub fn output_key(&self, timestamp_ms: i64) -> String {
        format!("{}/{}", self.username, self.output_file_name(timestamp_ms))
    }

    /// Extension of the source file, used to name the staged input.
    pub fn input_extension(&self) -> Option<&str> {
        let name = self.input_key_file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext)
    }

    fn input_key_file_name(&self) -> &str {
        let key = self.s3_key.as_deref().unwrap_or(&self.file_name);
        key.rsplit('/').next().unwrap_or(key)
    }
}
