//! Poller module: drives the job processor on a fixed cadence.
//!
//! Each tick spawns one processor cycle as its own task, so an error or a
//! panic inside a cycle never ends the loop. With single-flight enabled a tick
//! that finds the previous cycle still running is skipped.

mod config;
mod runner;
mod types;

pub use config::PollerConfig;
pub use runner::Poller;
pub use types::PollerStatus;
