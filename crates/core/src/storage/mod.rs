//! Storage module: source and destination of converted objects.
//!
//! The `ObjectStore` trait reads objects as byte streams, writes staged files
//! back under a key, and derives the public locator of a stored object.

mod config;
mod error;
mod s3;
mod traits;
mod types;

pub use config::StorageConfig;
pub use error::StorageError;
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;
pub use types::{public_url, s3_public_url, ObjectReader};
