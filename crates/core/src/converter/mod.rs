//! Converter module for transcoding staged media files.
//!
//! This module provides the `Converter` trait and an implementation backed by
//! the `image` crate for raster formats (PNG, JPEG, WebP, GIF, BMP, TIFF, ...).
//!
//! Converters operate on staged files: the processor streams the source object
//! to disk, the converter reads it and writes the output next to it, and the
//! processor uploads the result. Neither side holds the raw object in memory.
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::converter::{ConversionJob, Converter, ConverterConfig, ImageConverter};
//!
//! let converter = ImageConverter::new(ConverterConfig::default());
//! converter.validate().await?;
//!
//! let job = ConversionJob {
//!     job_id: "msg-1".to_string(),
//!     input_path: PathBuf::from("/tmp/stage/input.bmp"),
//!     output_path: PathBuf::from("/tmp/stage/converted-1700000000000.png"),
//!     format: "png".to_string(),
//! };
//!
//! let result = converter.convert(job).await?;
//! println!("{} bytes of {}", result.output_size_bytes, result.content_type);
//! ```

mod config;
mod error;
mod raster;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use raster::ImageConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionResult};
