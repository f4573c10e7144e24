// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./truckline.toml` >
//! `~/.config/truckline/truckline.toml` > `/etc/truckline/truckline.toml`
//! with environment variable overrides via `TRUCKLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TrucklineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/truckline/truckline.toml` (system-wide)
/// 3. `~/.config/truckline/truckline.toml` (user XDG config)
/// 4. `./truckline.toml` (local directory)
/// 5. `TRUCKLINE_*` environment variables
pub fn load_config() -> Result<TrucklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrucklineConfig::default()))
        .merge(Toml::file("/etc/truckline/truckline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("truckline/truckline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("truckline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TrucklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrucklineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TrucklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TrucklineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TRUCKLINE_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("TRUCKLINE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("fleet_", "fleet.", 1)
            .replacen("realtime_", "realtime.", 1)
            .replacen("limits_", "limits.", 1);
        mapped.into()
    })
}
