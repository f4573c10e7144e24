// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! "did you mean?" suggestions using Jaro-Winkler string similarity.

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 catches common typos like `databse_path` -> `database_path`
/// while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Every key the configuration model accepts, used for suggestions.
const KNOWN_KEYS: &[&str] = &[
    "server",
    "server.host",
    "server.port",
    "server.log_level",
    "storage",
    "storage.database_path",
    "fleet",
    "fleet.seed_demo_fleet",
    "realtime",
    "realtime.poll_interval_secs",
    "realtime.reconnect_delay_secs",
    "realtime.reconnect_max_attempts",
    "limits",
    "limits.booking_quota",
    "limits.quota_window_secs",
];

/// A configuration error suitable for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(truckline::config::unknown_key),
        help("{}", suggestion.as_deref().map(|s| format!("did you mean `{s}`?")).unwrap_or_else(|| "see truckline.toml.example for valid keys".to_string()))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
    },

    /// A value failed to deserialize (wrong type, bad enum label, etc.).
    #[error("invalid configuration value: {message}")]
    #[diagnostic(code(truckline::config::invalid_value))]
    Parse {
        /// Figment's description of the failure.
        message: String,
    },

    /// A semantic constraint was violated after deserialization.
    #[error("{message}")]
    #[diagnostic(code(truckline::config::validation))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },
}

/// Convert a figment extraction error into diagnostics, attaching fuzzy
/// key suggestions for unknown-key failures.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| match &e.kind {
            figment::error::Kind::UnknownField(field, _) => ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field),
            },
            _ => ConfigError::Parse {
                message: e.to_string(),
            },
        })
        .collect()
}

/// Render collected config errors to stderr via miette.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("{:?}", miette::Report::msg(error.to_string()));
        if let Some(help) = error.help() {
            eprintln!("  help: {help}");
        }
    }
}

/// Best fuzzy match for an unknown key, if close enough.
fn suggest_key(unknown: &str) -> Option<String> {
    KNOWN_KEYS
        .iter()
        .map(|candidate| {
            let leaf = candidate.rsplit('.').next().unwrap_or(candidate);
            (candidate, strsim::jaro_winkler(unknown, leaf))
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(candidate, _)| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typo_gets_a_suggestion() {
        let suggestion = suggest_key("databse_path");
        assert_eq!(suggestion.as_deref(), Some("storage.database_path"));
    }

    #[test]
    fn nonsense_gets_no_suggestion() {
        assert!(suggest_key("zzqqxx").is_none());
    }

    #[test]
    fn unknown_field_maps_to_unknown_key() {
        let err = crate::loader::load_config_from_str("[server]\nhost = \"0.0.0.0\"\nprot = 8090\n")
            .unwrap_err();
        let errors = figment_to_config_errors(err);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, .. } if key == "prot"
        )));
    }
}
