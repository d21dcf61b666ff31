// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth session store.
//!
//! Lifecycle: login -> token persisted -> user fetched -> logout clears
//! both. On startup, [`AuthStore::restore`] re-installs a previously
//! persisted token; an expired token is detected there and cleared
//! silently, falling back to the unauthenticated state.

pub mod token;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use phaply_api::{ApiClient, RegisterRequest};
use phaply_core::{PhaplyError, UserProfile};
use tracing::{debug, warn};

/// Holds the current access token and authenticated user profile.
pub struct AuthStore {
    api: Arc<ApiClient>,
    token_path: PathBuf,
    state: Mutex<AuthState>,
}

#[derive(Default)]
struct AuthState {
    user: Option<UserProfile>,
}

impl AuthStore {
    pub fn new(api: Arc<ApiClient>, token_path: PathBuf) -> Self {
        Self {
            api,
            token_path,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// The authenticated user profile, if one has been fetched.
    pub fn user(&self) -> Option<UserProfile> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).user.clone()
    }

    /// Whether a bearer token is currently installed on the API client.
    pub fn is_authenticated(&self) -> bool {
        self.api.has_token()
    }

    /// Logs in, persists the token, installs it on the client, and fetches
    /// the user profile. Credential failures propagate to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), PhaplyError> {
        let access_token = self.api.login(email, password).await?;
        token::store(&self.token_path, &access_token)?;
        self.api.set_token(Some(access_token));
        self.fetch_user().await;
        Ok(())
    }

    /// Registers a new account. Server validation detail propagates verbatim.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), PhaplyError> {
        self.api
            .register(&RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.to_string(),
            })
            .await
    }

    /// Refreshes the user profile. Failures leave the profile empty; they
    /// are logged, never propagated.
    pub async fn fetch_user(&self) {
        let user = match self.api.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "failed to fetch user profile");
                None
            }
        };
        self.state.lock().unwrap_or_else(|e| e.into_inner()).user = user;
    }

    /// Restores a persisted token on startup. Returns whether the client
    /// ends up authenticated.
    ///
    /// An expired or rejected token is cleared from disk silently and the
    /// store falls back to the unauthenticated state. A transport failure
    /// keeps the token installed (the backend may simply be unreachable).
    pub async fn restore(&self) -> Result<bool, PhaplyError> {
        let Some(stored) = token::load(&self.token_path)? else {
            return Ok(false);
        };

        self.api.set_token(Some(stored));

        match self.api.current_user().await {
            Ok(user) => {
                self.state.lock().unwrap_or_else(|e| e.into_inner()).user = Some(user);
                Ok(true)
            }
            Err(e) if e.is_auth() => {
                debug!("stored token rejected, clearing");
                token::clear(&self.token_path)?;
                self.api.set_token(None);
                self.state.lock().unwrap_or_else(|e| e.into_inner()).user = None;
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "could not verify stored token");
                Ok(true)
            }
        }
    }

    /// Clears the persisted token and all in-memory auth state.
    pub fn logout(&self) -> Result<(), PhaplyError> {
        token::clear(&self.token_path)?;
        self.api.set_token(None);
        self.state.lock().unwrap_or_else(|e| e.into_inner()).user = None;
        Ok(())
    }
}
