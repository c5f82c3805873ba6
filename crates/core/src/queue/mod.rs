//! Queue module: where conversion jobs come from.
//!
//! The `JobQueue` trait abstracts a message queue with long-poll receive and
//! explicit acknowledgement (delete). Unacknowledged messages are redelivered
//! by the queue itself once their visibility timeout expires.

mod config;
mod error;
mod sqs;
mod traits;
mod types;

pub use config::QueueConfig;
pub use error::QueueError;
pub use sqs::SqsJobQueue;
pub use traits::JobQueue;
pub use types::QueueMessage;
