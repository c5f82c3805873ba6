//! Processor module: one polling cycle of the conversion worker.
//!
//! The `JobProcessor` drives each received message through
//! receive → fetch → transform → store → notify → acknowledge:
//! - The source object is streamed into a per-attempt temporary directory
//! - The converter turns the staged input into the requested format
//! - The staged output is uploaded under the owner's namespace
//! - Every attempt ends in exactly one status event
//!
//! Per-job failures never escape a cycle. Only a failed queue receive is
//! reported to the caller, which retries at its next tick.
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::processor::{JobProcessor, ProcessorConfig};
//!
//! let processor = JobProcessor::new(
//!     ProcessorConfig::default(),
//!     queue,
//!     store,
//!     converter,
//!     sink,
//! );
//!
//! let report = processor.run_one_cycle().await?;
//! println!("{} completed, {} failed", report.completed, report.failed);
//!
//! let status = processor.status().await;
//! println!("Cycles so far: {}", status.cycles);
//! ```

mod clock;
mod config;
mod error;
mod pipeline;
mod types;

pub use clock::{Clock, SystemClock};
pub use config::{FailurePolicy, PoisonPolicy, ProcessorConfig};
pub use error::{JobError, ProcessorError};
pub use pipeline::JobProcessor;
pub use types::{AttemptReport, CycleReport, ProcessorStatus};
