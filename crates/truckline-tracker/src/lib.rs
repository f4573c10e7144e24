// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking client for the Truckline freight broker.
//!
//! Consumes the gateway's real-time surface: a multiplexed WebSocket
//! subscription for push updates, backed by a polling fallback when the
//! channel is down. See [`client::Tracker`] for the session handle.

pub mod client;
pub mod poller;

pub use client::{BookingUpdate, Tracker, TrackerConfig, TrackerEvent, UpdateSource};
