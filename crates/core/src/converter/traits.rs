//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionResult};

/// A converter that can transcode a staged file into another format.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts `job.input_path` into `job.format`, writing `job.output_path`.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;

    /// Content type for an output format token, if the format can be produced.
    fn content_type(&self, format: &str) -> Option<String>;

    /// Returns true if `format` can be produced by this converter.
    fn supports_output(&self, format: &str) -> bool {
        self.content_type(format).is_some()
    }
}
