// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Truckline freight broker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Truckline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrucklineConfig {
    /// Gateway HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fleet bootstrap settings.
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Real-time tracking client settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Request quota settings.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "truckline.db".to_string()
}

/// Fleet bootstrap configuration.
///
/// Trucks are provisioned by the fleet system; the demo seed stands in for
/// it on fresh local databases.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    /// Seed a small demo fleet on first start when the trucks table is empty.
    #[serde(default)]
    pub seed_demo_fleet: bool,
}

/// Real-time tracking client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Fallback poll interval in seconds, used while the channel is down.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Fixed delay between reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    /// Reconnect attempts before giving up on push and relying on polling.
    #[serde(default = "default_reconnect_max_attempts")]
    pub reconnect_max_attempts: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            reconnect_delay_secs: default_reconnect_delay(),
            reconnect_max_attempts: default_reconnect_max_attempts(),
        }
    }
}

fn default_poll_interval() -> u64 {
    10
}

fn default_reconnect_delay() -> u64 {
    5
}

fn default_reconnect_max_attempts() -> u32 {
    5
}

/// Request quota configuration for booking creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Booking creations allowed per identifier per window.
    #[serde(default = "default_booking_quota")]
    pub booking_quota: u32,

    /// Rolling window length in seconds.
    #[serde(default = "default_quota_window")]
    pub quota_window_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            booking_quota: default_booking_quota(),
            quota_window_secs: default_quota_window(),
        }
    }
}

fn default_booking_quota() -> u32 {
    30
}

fn default_quota_window() -> u64 {
    60
}
