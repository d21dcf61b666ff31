// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the phaply configuration system.

use phaply_config::diagnostic::suggest_key;
use phaply_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_phaply_config() {
    let toml = r#"
[api]
base_url = "https://phaply.example.com/api"
timeout_secs = 10

[auth]
token_path = "/tmp/phaply-token"

[search]
limit = 10
mode = "semantic"
detail_source = "json"

[client]
stale_responses = "last-wins"

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.api.base_url, "https://phaply.example.com/api");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.auth.token_path.as_deref(), Some("/tmp/phaply-token"));
    assert_eq!(config.search.limit, 10);
    assert_eq!(config.search.mode, "semantic");
    assert_eq!(config.search.detail_source, "json");
    assert_eq!(config.client.stale_responses, "last-wins");
    assert_eq!(config.log.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.auth.token_path.is_none());
    assert_eq!(config.search.limit, 20);
    assert_eq!(config.search.mode, "fast");
    assert_eq!(config.search.detail_source, "auto");
    assert_eq!(config.client.stale_responses, "discard");
    assert_eq!(config.log.level, "info");
}

/// Unknown field in a section is rejected.
#[test]
fn unknown_field_in_api_produces_error() {
    let toml = r#"
[api]
bse_url = "http://localhost"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bse_url"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Defaults pass validation end to end.
#[test]
fn default_config_validates() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.search.mode, "fast");
}

/// Semantic validation catches bad enum-like values and ranges.
#[test]
fn validation_collects_all_errors() {
    let toml = r#"
[api]
base_url = "ftp://backend"
timeout_secs = 0

[search]
limit = 0
mode = "exhaustive"

[client]
stale_responses = "retry"

[log]
level = "verbose"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    // One error per invalid field; validation does not fail fast.
    assert!(errors.len() >= 6, "expected collected errors, got {errors:?}");

    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    let all = rendered.join("\n");
    assert!(all.contains("api.base_url"));
    assert!(all.contains("api.timeout_secs"));
    assert!(all.contains("search.limit"));
    assert!(all.contains("search.mode"));
    assert!(all.contains("client.stale_responses"));
    assert!(all.contains("log.level"));
}

/// Typo suggestions use Jaro-Winkler similarity.
#[test]
fn suggest_key_for_near_miss() {
    assert_eq!(
        suggest_key("stale_response", &["stale_responses"]),
        Some("stale_responses".to_string())
    );
}
