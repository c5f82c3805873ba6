//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every adapter trait, so the
//! processor and poller can be exercised end to end without AWS.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediaconv_core::testing::{FixedClock, MockChannel, MockConverter, MockJobQueue, MockObjectStore};
//!
//! let queue = Arc::new(MockJobQueue::new());
//! let store = Arc::new(MockObjectStore::with_location("mybucket", "us-east-1"));
//! let converter = Arc::new(MockConverter::new());
//! let channel = Arc::new(MockChannel::new("live"));
//!
//! store.put_object("alice/photo.bmp", fixtures::bmp_bytes(4, 4)).await;
//! queue.push_body(fixtures::job_body("alice", "photo.bmp", "png")).await;
//! ```

mod call_log;
mod mock_channel;
mod mock_clock;
mod mock_converter;
mod mock_queue;
mod mock_store;

pub use call_log::CallLog;
pub use mock_channel::MockChannel;
pub use mock_clock::FixedClock;
pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_queue::{MockJobQueue, ReceiveCall};
pub use mock_store::{MockObjectStore, StoredObject};

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// A queue message body for the given job.
    pub fn job_body(username: &str, file_name: &str, format: &str) -> String {
        serde_json::json!({
            "username": username,
            "fileName": file_name,
            "format": format,
        })
        .to_string()
    }

    /// A queue message body with an explicit input key.
    pub fn job_body_with_key(username: &str, file_name: &str, format: &str, key: &str) -> String {
        serde_json::json!({
            "username": username,
            "fileName": file_name,
            "format": format,
            "s3Key": key,
        })
        .to_string()
    }

    /// A small gradient image in the given encoding.
    pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format)
            .expect("in-memory image encoding");
        buf.into_inner()
    }

    /// A small BMP image.
    pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
        image_bytes(width, height, ImageFormat::Bmp)
    }

    /// A small PNG image.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        image_bytes(width, height, ImageFormat::Png)
    }
}
