//! Raster image converter backed by the `image` crate.

use async_trait::async_trait;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionResult};

/// Converter for raster image formats.
///
/// Decoding and encoding run on the blocking thread pool; the whole
/// conversion is bounded by `ConverterConfig::timeout_secs`.
///
/// A blocking task cannot be aborted. When the bound expires the task is
/// flagged as cancelled and abandoned: it stops before encoding if it is
/// still decoding, and an encode already under way finishes into a staging
/// directory that may already be gone, in which case its output is lost.
pub struct ImageConverter {
    config: ConverterConfig,
}

impl ImageConverter {
    /// Creates a new image converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Resolves an output format token to an encodable image format.
    fn output_format(format: &str) -> Result<ImageFormat, ConverterError> {
        let image_format = ImageFormat::from_extension(format)
            .ok_or_else(|| ConverterError::unsupported_format(format))?;
        if !image_format.writing_enabled() {
            return Err(ConverterError::unsupported_format(format));
        }
        Ok(image_format)
    }
}

#[async_trait]
impl Converter for ImageConverter {
    fn name(&self) -> &str {
        "image"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        let target = Self::output_format(&job.format)?;

        if !tokio::fs::try_exists(&job.input_path).await.unwrap_or(false) {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        debug!(
            job_id = %job.job_id,
            "Converting {} to {:?}",
            job.input_path.display(),
            target
        );

        let input_path = job.input_path.clone();
        let output_path = job.output_path.clone();
        let max_dimension = self.config.max_dimension;
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = tokio::task::spawn_blocking({
            let cancelled = Arc::clone(&cancelled);
            move || transcode(&input_path, &output_path, target, max_dimension, &cancelled)
        });

        let input_format = match timeout(Duration::from_secs(self.config.timeout_secs), task).await
        {
            Err(_) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(ConverterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
            Ok(Err(join_error)) => {
                return Err(ConverterError::conversion_failed(join_error.to_string()))
            }
            Ok(Ok(result)) => result?,
        };

        let output_size_bytes = tokio::fs::metadata(&job.output_path).await?.len();

        Ok(ConversionResult {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
            input_format: input_format.and_then(format_token),
            output_format: job.format,
            content_type: target.to_mime_type().to_string(),
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if !ImageFormat::Png.writing_enabled() {
            return Err(ConverterError::unsupported_format("png"));
        }
        Ok(())
    }

    fn content_type(&self, format: &str) -> Option<String> {
        Self::output_format(format)
            .ok()
            .map(|f| f.to_mime_type().to_string())
    }
}

/// Decodes `input` and encodes it to `output` as `target`.
///
/// Returns the detected input format. Nothing is written once `cancelled`
/// is set before the encode starts.
fn transcode(
    input: &Path,
    output: &Path,
    target: ImageFormat,
    max_dimension: u32,
    cancelled: &AtomicBool,
) -> Result<Option<ImageFormat>, ConverterError> {
    let mut reader = ImageReader::open(input)?.with_guessed_format()?;
    let input_format = reader.format();

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);
    reader.limits(limits);

    let decoded = reader.decode().map_err(|e| match e {
        ImageError::IoError(io) => ConverterError::Io(io),
        other => ConverterError::corrupt_input(other.to_string()),
    })?;

    if cancelled.load(Ordering::Relaxed) {
        return Err(ConverterError::conversion_failed("cancelled before encoding"));
    }

    let prepared = prepare_for(decoded, target);
    prepared
        .save_with_format(output, target)
        .map_err(|e| match e {
            ImageError::IoError(io) => ConverterError::Io(io),
            other => ConverterError::conversion_failed(other.to_string()),
        })?;

    Ok(input_format)
}

/// Narrows the pixel layout to one the target encoder accepts.
fn prepare_for(image: DynamicImage, target: ImageFormat) -> DynamicImage {
    match target {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Png | ImageFormat::Tiff => image,
        _ => match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
    }
}

fn format_token(format: ImageFormat) -> Option<String> {
    format.extensions_str().first().map(|ext| ext.to_string())
}
