// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking lifecycle controller for the Truckline freight broker.
//!
//! `truckline-dispatch` sits between the transport layer and storage: it
//! owns the quote registry, enforces the booking window and quote
//! consumption rules, drives status transitions, and fans committed
//! mutations out as [`truckline_core::StatusEvent`]s.

pub mod controller;
pub mod quotes;

pub use controller::{BookingRequest, Dispatcher};
pub use quotes::QuoteRegistry;
