// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the booking REST API.
//!
//! Domain errors map onto HTTP statuses here and nowhere else: input
//! problems are 4xx, transient infrastructure problems are 503 so clients
//! know a retry can help.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use truckline_core::{Booking, BookingStatus, PriceQuote, StatusHistoryEntry, Truck, TrucklineError};
use truckline_dispatch::BookingRequest;
use truckline_pricing::QuoteRequest;

use crate::server::GatewayState;

/// Identifier header consulted by the booking-creation rate limiter.
/// Absent header falls back to a shared anonymous bucket.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Whether retrying the same request later can succeed.
    pub retryable: bool,
}

/// Domain error carried through axum's response conversion.
#[derive(Debug)]
pub struct ApiError(pub TrucklineError);

impl From<TrucklineError> for ApiError {
    fn from(e: TrucklineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TrucklineError::Validation(_) => StatusCode::BAD_REQUEST,
            TrucklineError::QuoteNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TrucklineError::QuoteExpired { .. } => StatusCode::GONE,
            TrucklineError::IllegalTransition { .. } => StatusCode::CONFLICT,
            TrucklineError::NotFound { .. } => StatusCode::NOT_FOUND,
            TrucklineError::Storage { .. }
            | TrucklineError::Channel { .. }
            | TrucklineError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TrucklineError::Config(_) | TrucklineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

/// Request body for POST /v1/bookings/{id}/status.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for POST /v1/bookings/{id}/cancel.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
    #[serde(default)]
    pub actor: Option<String>,
}

/// Request body for POST /v1/bookings/{id}/pod.
#[derive(Debug, Deserialize)]
pub struct PodRequest {
    pub reference: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /v1/quotes
pub async fn post_quote(
    State(state): State<GatewayState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, ApiError> {
    Ok(Json(state.dispatcher.price(body)?))
}

/// POST /v1/bookings
///
/// Rate-limited per client identifier before the dispatcher is consulted.
pub async fn post_booking(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<BookingRequest>,
) -> Result<Response, ApiError> {
    let identifier = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous");
    if !state.limiter.allow(identifier) {
        tracing::warn!(identifier, "booking creation rate limit hit");
        let body = ErrorResponse {
            error: "booking quota exceeded, retry in the next window".into(),
            retryable: true,
        };
        return Ok((StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response());
    }

    let booking = state.dispatcher.create_booking(body).await?;
    Ok((StatusCode::CREATED, Json(booking)).into_response())
}

/// GET /v1/bookings/{id} -- also the polling fallback's read path.
pub async fn get_booking(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.dispatcher.get_booking(&id).await?))
}

/// POST /v1/bookings/{id}/status
pub async fn post_status(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .dispatcher
        .update_status(&id, body.status, body.actor, body.note)
        .await?;
    Ok(Json(booking))
}

/// POST /v1/bookings/{id}/cancel
pub async fn post_cancel(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<Booking>, ApiError> {
    if body.reason.trim().is_empty() {
        return Err(ApiError(TrucklineError::Validation(
            "cancellation reason must not be empty".into(),
        )));
    }
    let booking = state.dispatcher.cancel(&id, body.reason, body.actor).await?;
    Ok(Json(booking))
}

/// POST /v1/bookings/{id}/pod
pub async fn post_pod(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<PodRequest>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.dispatcher.attach_pod(&id, body.reference).await?))
}

/// GET /v1/bookings/{id}/history
pub async fn get_history(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StatusHistoryEntry>>, ApiError> {
    Ok(Json(state.dispatcher.history(&id).await?))
}

/// GET /v1/trucks -- fleet availability listing.
pub async fn get_trucks(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<Truck>>, ApiError> {
    Ok(Json(state.dispatcher.fleet().await?))
}

/// GET /health -- unauthenticated liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
