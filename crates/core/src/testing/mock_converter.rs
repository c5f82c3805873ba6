//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::call_log::{self, CallLog};
use crate::converter::{ConversionJob, ConversionResult, Converter, ConverterError};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the staged input existed when the conversion ran.
    pub input_existed: bool,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs for assertions
/// - Simulate success/failure
/// - Simulate slow conversions and panics
///
/// A successful conversion copies the staged input to the output path, so
/// the stored object has the source bytes.
///
/// # Example
///
/// ```rust,ignore
/// use mediaconv_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.set_next_error(ConverterError::corrupt_input("bad header")).await;
///
/// // ... run a cycle ...
///
/// let conversions = converter.recorded_conversions().await;
/// assert_eq!(conversions.len(), 1);
/// assert!(!conversions[0].success);
/// ```
#[derive(Debug)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// If set, the next conversion will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration.
    conversion_delay: Arc<RwLock<Duration>>,
    /// If set, the next conversion panics.
    panic_next: Arc<RwLock<bool>>,
    /// Shared call sequence, if attached.
    call_log: Option<CallLog>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            conversion_delay: Arc::new(RwLock::new(Duration::ZERO)),
            panic_next: Arc::new(RwLock::new(false)),
            call_log: None,
        }
    }

    /// Record calls into a shared sequence.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_delay(&self, delay: Duration) {
        *self.conversion_delay.write().await = delay;
    }

    /// Make the next conversion panic.
    pub async fn set_panic_next(&self) {
        *self.panic_next.write().await = true;
    }

    async fn record(&self, job: ConversionJob, input_existed: bool, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            job,
            input_existed,
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        call_log::record(&self.call_log, "convert").await;
        let input_existed = tokio::fs::try_exists(&job.input_path).await.unwrap_or(false);

        let delay = *self.conversion_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if std::mem::take(&mut *self.panic_next.write().await) {
            self.record(job, input_existed, false).await;
            panic!("mock converter panic");
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.record(job, input_existed, false).await;
            return Err(err);
        }

        let Some(content_type) = self.content_type(&job.format) else {
            self.record(job.clone(), input_existed, false).await;
            return Err(ConverterError::unsupported_format(&job.format));
        };

        if !input_existed {
            let path = job.input_path.clone();
            self.record(job, input_existed, false).await;
            return Err(ConverterError::InputNotFound { path });
        }

        let output_size_bytes = tokio::fs::copy(&job.input_path, &job.output_path).await?;
        let result = ConversionResult {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes,
            duration_ms: delay.as_millis() as u64,
            input_format: job
                .input_path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_string()),
            output_format: job.format.clone(),
            content_type,
        };
        self.record(job, input_existed, true).await;
        Ok(result)
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }

    fn content_type(&self, format: &str) -> Option<String> {
        let mime = match format.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            _ => return None,
        };
        Some(mime.to_string())
    }
}
