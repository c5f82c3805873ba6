//! WebSocket subscription to job status events.
//!
//! Each connection gets a greeting, then every status payload published on
//! the broadcast channel for as long as it stays connected.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use mediaconv_core::BroadcastPayload;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// First message sent on every new connection.
pub const GREETING: &str = "Welcome to the File Converter Service!";

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let Some(channel) = state.broadcast() else {
        return (StatusCode::NOT_FOUND, "broadcast disabled").into_response();
    };

    // Subscribe before the upgrade so no event published during the
    // handshake is missed.
    let rx = channel.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<BroadcastPayload>) {
    let (mut sender, mut receiver) = socket.split();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket subscriber connected");

    let send_task = tokio::spawn(async move {
        if sender.send(Message::Text(GREETING.into())).await.is_err() {
            debug!("Subscriber left before greeting");
            return;
        }
        WS_MESSAGES_SENT.with_label_values(&["greeting"]).inc();

        loop {
            match rx.recv().await {
                Ok(payload) => {
                    let json = match serde_json::to_string(&payload) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize status payload: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, subscriber disconnected");
                        break;
                    }
                    WS_MESSAGES_SENT.with_label_values(&["status"]).inc();
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket subscriber lagged, skipped {} events", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Subscribers are receive-only; inbound frames only tell us when they leave.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket subscriber requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring subscriber message: {}", text.as_str());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket subscriber disconnected");
}
