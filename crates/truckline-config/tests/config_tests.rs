// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading and validation.

use truckline_config::{load_and_validate_str, ConfigError};

#[test]
fn empty_config_yields_defaults() {
    let config = load_and_validate_str("").unwrap();
    assert_eq!(config.server.port, 8090);
    assert_eq!(config.storage.database_path, "truckline.db");
}

#[test]
fn sections_override_defaults() {
    let config = load_and_validate_str(
        r#"
        [server]
        host = "0.0.0.0"
        port = 9000
        log_level = "debug"

        [storage]
        database_path = "/var/lib/truckline/truckline.db"

        [realtime]
        poll_interval_secs = 30
        "#,
    )
    .unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/var/lib/truckline/truckline.db");
    assert_eq!(config.realtime.poll_interval_secs, 30);
    // Untouched sections keep defaults.
    assert_eq!(config.realtime.reconnect_max_attempts, 5);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let result = load_and_validate_str(
        r#"
        [storage]
        databse_path = "oops.db"
        "#,
    );
    let errors = result.unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s.contains("database_path")
    )));
}

#[test]
fn semantic_violations_are_collected() {
    let result = load_and_validate_str(
        r#"
        [realtime]
        poll_interval_secs = 0
        reconnect_delay_secs = 0
        "#,
    );
    let errors = result.unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let result = load_and_validate_str(
        r#"
        [server]
        port = "not-a-number"
        "#,
    );
    assert!(result.is_err());
}
