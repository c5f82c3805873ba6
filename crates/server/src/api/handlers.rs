use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use mediaconv_core::{PollerStatus, ProcessorStatus, SanitizedConfig};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct NotifierStatus {
    pub channels: Vec<String>,
    /// Connected WebSocket subscribers; `None` when broadcast is disabled.
    pub subscribers: Option<usize>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub processor: ProcessorStatus,
    pub poller: PollerStatus,
    pub notifier: NotifierStatus,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let processor = state.processor();

    Json(StatusResponse {
        version: VERSION.to_string(),
        processor: processor.status().await,
        poller: state.poller().status(),
        notifier: NotifierStatus {
            channels: processor.channel_names(),
            subscribers: state.broadcast().map(|b| b.subscriber_count()),
        },
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
