// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Truckline freight broker.
//!
//! REST endpoints cover quoting and the booking lifecycle; the WebSocket
//! endpoint pushes status updates to subscribed clients. The same read
//! endpoint that serves ad-hoc lookups doubles as the polling fallback for
//! clients whose push channel is down, so both mechanisms converge on
//! identical state.

pub mod handlers;
pub mod ratelimit;
pub mod server;
pub mod subscriptions;
pub mod ws;

pub use server::{start_server, GatewayState, ServerConfig};
