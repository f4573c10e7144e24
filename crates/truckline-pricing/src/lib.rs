// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing engine and ETA estimator for the Truckline freight broker.
//!
//! Both are pure leaves: quote computation maps (distance, weight, cargo
//! profile) to a time-bounded price breakdown, and the ETA estimator maps
//! (phase, remaining distance) to minutes. Neither touches external state.

pub mod distance;
pub mod eta;
pub mod quote;

pub use distance::haversine_km;
pub use eta::{eta_minutes, TrackingPhase};
pub use quote::{compute_quote, QuoteRequest};
