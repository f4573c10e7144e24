// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Truckline freight broker.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! functions for bookings, trucks, and the append-only status history.
//! Booking mutations are transactional across all three tables.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
