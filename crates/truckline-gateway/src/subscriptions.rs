// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The WebSocket subscription map and the status-event fanout loop.
//!
//! One client connection can watch any number of bookings; one booking can
//! be watched by any number of connections. The map is
//! `booking_id -> (conn_id -> sender)`. Missed pushes are not persisted:
//! a client that was not subscribed at mutation time reads current state
//! through `GET /v1/bookings/{id}` instead.

use dashmap::DashMap;
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use truckline_core::StatusEvent;

/// Shared registry of live WebSocket subscriptions.
#[derive(Default)]
pub struct SubscriptionMap {
    bookings: DashMap<String, DashMap<String, mpsc::Sender<String>>>,
}

impl SubscriptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a booking. Re-subscribing replaces the
    /// sender, so it is idempotent per (booking, connection) pair.
    pub fn subscribe(&self, booking_id: &str, conn_id: &str, tx: mpsc::Sender<String>) {
        self.bookings
            .entry(booking_id.to_string())
            .or_default()
            .insert(conn_id.to_string(), tx);
    }

    pub fn unsubscribe(&self, booking_id: &str, conn_id: &str) {
        if let Some(conns) = self.bookings.get(booking_id) {
            conns.remove(conn_id);
        }
        self.bookings
            .remove_if(booking_id, |_, conns| conns.is_empty());
    }

    /// Remove a closed connection from every booking it watched.
    pub fn drop_conn(&self, conn_id: &str) {
        for entry in self.bookings.iter() {
            entry.value().remove(conn_id);
        }
        self.bookings.retain(|_, conns| !conns.is_empty());
    }

    /// Push a status update to every subscriber of the event's booking.
    ///
    /// A full per-connection queue drops the push for that connection
    /// rather than blocking the fanout; the client still converges through
    /// the read endpoint.
    pub fn publish(&self, event: &StatusEvent) {
        let Some(conns) = self.bookings.get(&event.booking_id) else {
            return;
        };
        let frame = status_update_frame(event);
        for conn in conns.iter() {
            if conn.value().try_send(frame.clone()).is_err() {
                debug!(
                    booking_id = %event.booking_id,
                    conn_id = %conn.key(),
                    "subscriber queue full or closed, push dropped"
                );
            }
        }
    }

    pub fn subscriber_count(&self, booking_id: &str) -> usize {
        self.bookings.get(booking_id).map_or(0, |c| c.len())
    }
}

/// Serialize the server -> client push frame.
fn status_update_frame(event: &StatusEvent) -> String {
    let mut frame = json!({
        "type": "status_update",
        "booking_id": event.booking_id,
        "status": event.status,
        "updated_at": event.updated_at,
    });
    if let Some(eta) = event.eta_minutes {
        frame["eta_minutes"] = json!(eta);
    }
    frame.to_string()
}

/// Forward dispatcher status events into the subscription map until the
/// event channel closes. Lagging only skips events; current state is
/// always recoverable through the read endpoint.
pub async fn run_event_fanout(
    mut events: broadcast::Receiver<StatusEvent>,
    subscriptions: std::sync::Arc<SubscriptionMap>,
) {
    loop {
        match events.recv().await {
            Ok(event) => subscriptions.publish(&event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event fanout lagged, pushes skipped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
