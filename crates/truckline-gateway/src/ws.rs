// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for real-time booking status push.
//!
//! One connection multiplexes any number of booking subscriptions.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "subscribe", "booking_id": "..."}
//! {"type": "unsubscribe", "booking_id": "..."}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "subscribed", "booking_id": "..."}
//! {"type": "status_update", "booking_id": "...", "status": "in_transit",
//!  "eta_minutes": 67, "updated_at": "..."}
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::server::GatewayState;

/// Per-connection outbound queue depth. Chosen to absorb bursts across a
/// handful of watched bookings without letting one dead client pin memory.
const OUTBOUND_QUEUE: usize = 64;

/// Subscription control frame from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Subscribe { booking_id: String },
    Unsubscribe { booking_id: String },
}

/// WebSocket upgrade handler for GET /ws.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one client connection.
///
/// A sender task drains this connection's mpsc queue into the socket;
/// the receive loop handles control frames. Teardown removes the
/// connection from every subscription set.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let conn_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    let sender_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    debug!(conn_id = %conn_id, "websocket connected");

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let frame: ClientFrame = match serde_json::from_str(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(conn_id = %conn_id, "invalid websocket frame: {e}");
                        let _ = tx
                            .send(
                                json!({"type": "error", "error": "unrecognized frame"})
                                    .to_string(),
                            )
                            .await;
                        continue;
                    }
                };
                match frame {
                    ClientFrame::Subscribe { booking_id } => {
                        state
                            .subscriptions
                            .subscribe(&booking_id, &conn_id, tx.clone());
                        debug!(conn_id = %conn_id, booking_id = %booking_id, "subscribed");
                        let _ = tx
                            .send(
                                json!({"type": "subscribed", "booking_id": booking_id})
                                    .to_string(),
                            )
                            .await;
                    }
                    ClientFrame::Unsubscribe { booking_id } => {
                        state.subscriptions.unsubscribe(&booking_id, &conn_id);
                        debug!(conn_id = %conn_id, booking_id = %booking_id, "unsubscribed");
                    }
                }
            }
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; ping/pong is
            // handled by the axum ws layer.
            _ => {}
        }
    }

    state.subscriptions.drop_conn(&conn_id);
    sender_task.abort();
    debug!(conn_id = %conn_id, "websocket closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_frame_deserializes() {
        let json = r#"{"type": "subscribe", "booking_id": "b-1"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(frame, ClientFrame::Subscribe { booking_id } if booking_id == "b-1"));
    }

    #[test]
    fn unsubscribe_frame_deserializes() {
        let json = r#"{"type": "unsubscribe", "booking_id": "b-1"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(frame, ClientFrame::Unsubscribe { booking_id } if booking_id == "b-1"));
    }

    #[test]
    fn unknown_frame_type_is_rejected() {
        let json = r#"{"type": "teleport", "booking_id": "b-1"}"#;
        assert!(serde_json::from_str::<ClientFrame>(json).is_err());
    }
}
