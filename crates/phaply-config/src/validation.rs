// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape, enum-like string values, and ranges.

use phaply_core::StalePolicy;

use crate::diagnostic::ConfigError;
use crate::model::PhaplyConfig;

const VALID_MODES: &[&str] = &["fast", "semantic"];
const VALID_SOURCES: &[&str] = &["auto", "json", "qdrant"];
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PhaplyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.search.limit == 0 || config.search.limit > 100 {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.limit must be between 1 and 100, got {}",
                config.search.limit
            ),
        });
    }

    if !VALID_MODES.contains(&config.search.mode.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.mode must be one of {VALID_MODES:?}, got `{}`",
                config.search.mode
            ),
        });
    }

    if !VALID_SOURCES.contains(&config.search.detail_source.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.detail_source must be one of {VALID_SOURCES:?}, got `{}`",
                config.search.detail_source
            ),
        });
    }

    if let Err(message) = StalePolicy::parse(&config.client.stale_responses) {
        errors.push(ConfigError::Validation {
            message: format!("client.stale_responses: {message}"),
        });
    }

    if !VALID_LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {VALID_LOG_LEVELS:?}, got `{}`",
                config.log.level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
