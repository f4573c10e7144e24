// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and non-zero intervals.

use crate::diagnostic::ConfigError;
use crate::model::TrucklineConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TrucklineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.realtime.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.realtime.reconnect_delay_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.reconnect_delay_secs must be at least 1".to_string(),
        });
    }

    if config.limits.booking_quota == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.booking_quota must be at least 1".to_string(),
        });
    }

    if config.limits.quota_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.quota_window_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
