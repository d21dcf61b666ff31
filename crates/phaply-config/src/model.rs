// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the phaply client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level phaply configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PhaplyConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Auth token storage settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Search behavior settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Store behavior settings shared across features.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the backend, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Auth token storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Path of the bearer-token file. `None` uses
    /// `<config dir>/phaply/token`. This file is the only client-side
    /// persisted state.
    #[serde(default)]
    pub token_path: Option<String>,
}

/// Search behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum number of results requested per search.
    #[serde(default = "default_search_limit")]
    pub limit: u32,

    /// Search mode sent to the backend: `fast` or `semantic`.
    #[serde(default = "default_search_mode")]
    pub mode: String,

    /// Law-detail source hint: `auto`, `json`, or `qdrant`.
    #[serde(default = "default_detail_source")]
    pub detail_source: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
            mode: default_search_mode(),
            detail_source: default_detail_source(),
        }
    }
}

fn default_search_limit() -> u32 {
    20
}

fn default_search_mode() -> String {
    "fast".to_string()
}

fn default_detail_source() -> String {
    "auto".to_string()
}

/// Store behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// What to do with responses that arrive after a newer request has
    /// already been answered: `discard` (default) or `last-wins`.
    #[serde(default = "default_stale_responses")]
    pub stale_responses: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            stale_responses: default_stale_responses(),
        }
    }
}

fn default_stale_responses() -> String {
    "discard".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
