//! Types for the storage module.

use std::pin::Pin;
use tokio::io::AsyncRead;

/// Streaming body of a fetched object.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Virtual-hosted style S3 URL: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
pub fn s3_public_url(bucket: &str, region: &str, key: &str) -> String {
    format!(
        "https://{}.s3.{}.amazonaws.com/{}",
        bucket,
        region,
        encode_key(key)
    )
}

/// Public URL of `key`, rooted at `base_url` when one is configured.
pub fn public_url(bucket: &str, region: &str, base_url: Option<&str>, key: &str) -> String {
    match base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), encode_key(key)),
        None => s3_public_url(bucket, region, key),
    }
}

/// Percent-encodes each key segment, keeping `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
