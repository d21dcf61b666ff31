// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application context: constructs and owns the store instances.
//!
//! One `App` is built per run and passed by reference to the commands
//! that need it. There are no module-level singletons; tests construct
//! their own store instances the same way.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use phaply_api::ApiClient;
use phaply_auth::AuthStore;
use phaply_config::PhaplyConfig;
use phaply_consult::ConsultationStore;
use phaply_core::{PhaplyError, StalePolicy};
use phaply_search::SearchStore;
use phaply_tracking::TrackingStore;

pub struct App {
    pub config: PhaplyConfig,
    pub api: Arc<ApiClient>,
    pub auth: AuthStore,
    pub consult: ConsultationStore,
    pub search: SearchStore,
    pub tracking: TrackingStore,
}

impl App {
    pub fn new(config: PhaplyConfig) -> Result<Self, PhaplyError> {
        let api = Arc::new(ApiClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )?);

        let stale_policy =
            StalePolicy::parse(&config.client.stale_responses).map_err(PhaplyError::Config)?;

        let token_path = config
            .auth
            .token_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(phaply_auth::token::default_token_path);

        Ok(Self {
            auth: AuthStore::new(api.clone(), token_path),
            consult: ConsultationStore::new(api.clone(), stale_policy),
            search: SearchStore::new(api.clone(), &config.search, stale_policy),
            tracking: TrackingStore::new(api.clone()),
            api,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_builds_from_default_config() {
        let app = App::new(PhaplyConfig::default()).expect("default config should build");
        assert!(!app.auth.is_authenticated());
        assert!(app.consult.messages().is_empty());
    }

    #[test]
    fn app_rejects_bad_stale_policy() {
        let mut config = PhaplyConfig::default();
        config.client.stale_responses = "retry".to_string();
        assert!(App::new(config).is_err());
    }
}
