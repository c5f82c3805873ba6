//! HTTP surface and process wiring for the media conversion worker.

pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::AppState;
