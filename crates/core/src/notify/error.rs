//! Error types for the notification module.

use thiserror::Error;

/// Errors that can occur while delivering a status event.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel could not be set up.
    #[error("invalid notification channel configuration: {0}")]
    Config(String),

    /// The request never got a response.
    #[error("notification transport failed: {0}")]
    Transport(String),

    /// The receiver answered with a non-success status.
    #[error("notification rejected with HTTP {status}")]
    Rejected { status: u16 },
}
