// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Truckline freight broker.
//!
//! This crate provides the domain entity types, the booking status state
//! machine, and the error type used throughout the Truckline workspace.

pub mod error;
pub mod status;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TrucklineError;
pub use status::{BookingStatus, CapacityTier};
pub use types::{
    Booking, CargoDetails, Location, PriceBreakdown, PriceQuote, StatusEvent,
    StatusHistoryEntry, Truck,
};
