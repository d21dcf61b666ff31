// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./phaply.toml` > `~/.config/phaply/phaply.toml` >
//! `/etc/phaply/phaply.toml` with environment variable overrides via the
//! `PHAPLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PhaplyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/phaply/phaply.toml` (system-wide)
/// 3. `~/.config/phaply/phaply.toml` (user XDG config)
/// 4. `./phaply.toml` (local directory)
/// 5. `PHAPLY_*` environment variables
pub fn load_config() -> Result<PhaplyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PhaplyConfig::default()))
        .merge(Toml::file("/etc/phaply/phaply.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("phaply/phaply.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("phaply.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PhaplyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PhaplyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PhaplyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PhaplyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PHAPLY_API_BASE_URL` must map to
/// `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("PHAPLY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: PHAPLY_API_BASE_URL -> "api_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("search_", "search.", 1)
            .replacen("client_", "client.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
