// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Truckline freight broker.

use thiserror::Error;

use crate::status::BookingStatus;

/// The primary error type used across all Truckline crates.
///
/// Variants fall into four buckets: caller input errors (`Validation`,
/// `QuoteNotFound`, `QuoteExpired`, `IllegalTransition`, `NotFound`),
/// transient infrastructure errors (`Storage`, `Channel`, `Timeout`),
/// configuration errors, and internal bugs. Only the transient bucket is
/// eligible for automatic retry -- see [`TrucklineError::is_retryable`].
#[derive(Debug, Error)]
pub enum TrucklineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Real-time channel errors (connection failure, message format, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed or out-of-range caller input (bad coordinates, weight out of
    /// the 0.1-50 tonne band, pickup time outside the booking window).
    #[error("validation error: {0}")]
    Validation(String),

    /// The supplied quote calculation ID is unknown or was already consumed.
    #[error("quote not found: {calculation_id}")]
    QuoteNotFound { calculation_id: String },

    /// The quote's validity window elapsed before booking creation.
    #[error("quote expired: {calculation_id}")]
    QuoteExpired { calculation_id: String },

    /// A status mutation was requested along an edge the state machine forbids.
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// The referenced booking does not exist.
    #[error("booking not found: {booking_id}")]
    NotFound { booking_id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrucklineError {
    /// Whether a caller may retry the failed operation unchanged.
    ///
    /// Transient infrastructure failures roll back cleanly (nothing partially
    /// applied), so the same request -- including a still-valid quote -- can
    /// be retried. Input and domain errors never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrucklineError::Storage { .. }
                | TrucklineError::Channel { .. }
                | TrucklineError::Timeout { .. }
        )
    }
}
