//! Notification module: telling interested parties how a job ended.
//!
//! A [`NotificationSink`] fans one [`StatusEvent`] out to every configured
//! [`NotificationChannel`]. Two channels exist:
//!
//! - [`BroadcastChannel`]: live subscribers (WebSocket clients) receive
//!   `{message, file, url}` best-effort; nobody listening is not an error.
//! - [`UpstreamChannel`]: `POST /api/update-status` on a coordinating service
//!   with `{username, fileName, status, url, message}`.
//!
//! Channel failures are logged and counted, never propagated: the outcome of
//! a job does not depend on whether anyone heard about it.

mod broadcast;
mod config;
mod error;
mod sink;
mod traits;
mod types;
mod upstream;

pub use broadcast::BroadcastChannel;
pub use config::{BroadcastConfig, NotifierConfig, UpstreamConfig};
pub use error::NotifyError;
pub use sink::{NotificationSink, PublishReport};
pub use traits::NotificationChannel;
pub use types::{BroadcastPayload, JobOutcome, StatusEvent, UpstreamStatus};
pub use upstream::UpstreamChannel;
