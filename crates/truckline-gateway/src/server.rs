// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state, and runs the status-event
//! fanout task alongside the server.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use truckline_core::TrucklineError;
use truckline_dispatch::Dispatcher;

use crate::handlers;
use crate::ratelimit::FixedWindowLimiter;
use crate::subscriptions::{run_event_fanout, SubscriptionMap};
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Dispatcher,
    pub subscriptions: Arc<SubscriptionMap>,
    pub limiter: Arc<FixedWindowLimiter>,
}

/// Gateway server configuration (mirrors `ServerConfig` + `LimitsConfig`
/// from `truckline-config`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Booking creations allowed per identifier per window.
    pub booking_quota: u32,
    pub quota_window_secs: u64,
}

/// Build the full route table for the given state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/quotes", post(handlers::post_quote))
        .route("/v1/bookings", post(handlers::post_booking))
        .route("/v1/bookings/{id}", get(handlers::get_booking))
        .route("/v1/bookings/{id}/status", post(handlers::post_status))
        .route("/v1/bookings/{id}/cancel", post(handlers::post_cancel))
        .route("/v1/bookings/{id}/pod", post(handlers::post_pod))
        .route("/v1/bookings/{id}/history", get(handlers::get_history))
        .route("/v1/trucks", get(handlers::get_trucks))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP/WebSocket server and the event fanout.
///
/// Runs until the listener fails; shutdown is the caller aborting the
/// task. The fanout task ends on its own when the dispatcher (and with it
/// the event channel) is dropped.
pub async fn start_server(
    config: &ServerConfig,
    dispatcher: Dispatcher,
) -> Result<(), TrucklineError> {
    let subscriptions = Arc::new(SubscriptionMap::new());
    let state = GatewayState {
        dispatcher: dispatcher.clone(),
        subscriptions: Arc::clone(&subscriptions),
        limiter: Arc::new(FixedWindowLimiter::new(
            config.booking_quota,
            config.quota_window_secs,
        )),
    };

    tokio::spawn(run_event_fanout(dispatcher.subscribe_events(), subscriptions));

    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TrucklineError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| TrucklineError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8090,
            booking_quota: 30,
            quota_window_secs: 60,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8090"));
    }
}
