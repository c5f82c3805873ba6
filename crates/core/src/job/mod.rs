//! Job module: the unit of conversion work carried by one queue message.
//!
//! A queue message body is a JSON object of the form
//! `{"username": "...", "fileName": "...", "format": "..."}`, optionally with
//! an explicit `"s3Key"` naming the input object. Parsing produces a [`Job`],
//! from which the input and output object keys are derived.

mod types;

pub use types::{Job, JobParseError};
