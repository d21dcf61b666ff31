// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the phaply backend REST API.
//!
//! Provides [`ApiClient`] which handles request construction, bearer-token
//! authentication, and error decoding. There is no automatic retry or
//! backoff anywhere; transient failures are retried only by the user
//! repeating the action.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use phaply_core::{
    ContextType, LawItem, PhaplyError, SavedLaw, SavedQuestion, SessionSummary, TrackingStats,
    UserProfile,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{
    ApiErrorBody, ChatResponse, IsSavedResponse, LoginResponse, QueryInput, RegisterRequest,
    SaveLawRequest, SaveLawSessionResponse, SaveQuestionRequest, SearchParams, SearchResponse,
    SessionHistory, SessionStartResponse, UpdateQuestionRequest,
};

/// Authenticated HTTP client for the phaply backend.
///
/// The bearer token is swappable at runtime so a shared client observes
/// login/logout without being rebuilt.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: ArcSwapOption<SecretString>,
}

impl ApiClient {
    /// Creates a client for the given base URL (including the `/api` prefix).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PhaplyError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PhaplyError::Config(format!("invalid api.base_url: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PhaplyError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url,
            token: ArcSwapOption::empty(),
        })
    }

    /// Installs (or clears) the bearer token used for subsequent requests.
    pub fn set_token(&self, token: Option<SecretString>) {
        self.token.store(token.map(Arc::new));
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    /// Builds an endpoint URL from path segments, percent-encoding each one.
    /// Law ids contain spaces and diacritics ("Điều 5") and must never be
    /// spliced into a path by string formatting.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PhaplyError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| PhaplyError::Config("api.base_url cannot be a base".into()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token.load_full() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Sends a request and decodes a JSON response body.
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, PhaplyError> {
        let response = Self::send(builder).await?;
        let body = response.text().await.map_err(|e| PhaplyError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| PhaplyError::Transport {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a request where only the status matters.
    async fn fetch_unit(&self, builder: RequestBuilder) -> Result<(), PhaplyError> {
        Self::send(builder).await.map(|_| ())
    }

    async fn send(builder: RequestBuilder) -> Result<Response, PhaplyError> {
        let response = builder.send().await.map_err(|e| PhaplyError::Transport {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "response received");

        if status.is_success() {
            return Ok(response);
        }
        Err(Self::decode_error(status, response).await)
    }

    /// Decodes a non-2xx response into [`PhaplyError`], surfacing the
    /// server-provided `detail` message verbatim when present.
    async fn decode_error(status: StatusCode, response: Response) -> PhaplyError {
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.detail,
            Err(_) if body.is_empty() => status.to_string(),
            Err(_) => body,
        };

        if status == StatusCode::UNAUTHORIZED {
            PhaplyError::Auth(detail)
        } else {
            PhaplyError::Api {
                status: status.as_u16(),
                detail,
            }
        }
    }

    // --- Auth ---

    /// `POST /auth/login` with form-encoded credentials. Returns the access
    /// token; the caller decides whether to install it via [`set_token`].
    ///
    /// [`set_token`]: ApiClient::set_token
    pub async fn login(&self, email: &str, password: &str) -> Result<SecretString, PhaplyError> {
        let url = self.endpoint(&["auth", "login"])?;
        let builder = self
            .request(Method::POST, url)
            .form(&[("username", email), ("password", password)]);
        let response: LoginResponse = self.fetch_json(builder).await?;
        Ok(response.access_token.into())
    }

    /// `POST /auth/register`. Validation failures carry the server detail.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), PhaplyError> {
        let url = self.endpoint(&["auth", "register"])?;
        self.fetch_unit(self.request(Method::POST, url).json(request))
            .await
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> Result<UserProfile, PhaplyError> {
        let url = self.endpoint(&["auth", "me"])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }

    // --- Chat ---

    /// `POST /chat/session/start` with the context passed as query params.
    pub async fn start_session(
        &self,
        session_type: ContextType,
        law_id: Option<&str>,
    ) -> Result<SessionStartResponse, PhaplyError> {
        let url = self.endpoint(&["chat", "session", "start"])?;
        let mut params = vec![("session_type", session_type.to_string())];
        if let Some(law_id) = law_id {
            params.push(("law_id", law_id.to_string()));
        }
        self.fetch_json(self.request(Method::POST, url).query(&params))
            .await
    }

    /// `POST /chat/send`.
    pub async fn send_message(&self, input: &QueryInput) -> Result<ChatResponse, PhaplyError> {
        let url = self.endpoint(&["chat", "send"])?;
        self.fetch_json(self.request(Method::POST, url).json(input))
            .await
    }

    /// `GET /chat/history/{id}`.
    pub async fn session_history(&self, session_id: i64) -> Result<SessionHistory, PhaplyError> {
        let url = self.endpoint(&["chat", "history", &session_id.to_string()])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }

    /// `GET /chat/sessions`.
    pub async fn list_sessions(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<SessionSummary>, PhaplyError> {
        let url = self.endpoint(&["chat", "sessions"])?;
        self.fetch_json(
            self.request(Method::GET, url)
                .query(&[("skip", skip), ("limit", limit)]),
        )
        .await
    }

    /// `DELETE /chat/session/{id}`.
    pub async fn delete_session(&self, session_id: i64) -> Result<(), PhaplyError> {
        let url = self.endpoint(&["chat", "session", &session_id.to_string()])?;
        self.fetch_unit(self.request(Method::DELETE, url)).await
    }

    // --- Search ---

    /// `POST /search/search`. Absent filters are omitted from the query.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, PhaplyError> {
        let url = self.endpoint(&["search", "search"])?;
        let mut query = vec![
            ("keyword", params.keyword.clone()),
            ("mode", params.mode.clone()),
            ("limit", params.limit.to_string()),
        ];
        for (name, value) in [
            ("type_filter", &params.type_filter),
            ("year_filter", &params.year_filter),
            ("authority_filter", &params.authority_filter),
            ("article_filter", &params.article_filter),
        ] {
            if let Some(value) = value {
                query.push((name, value.clone()));
            }
        }
        self.fetch_json(self.request(Method::POST, url).query(&query))
            .await
    }

    /// `GET /search/laws/{id}`.
    pub async fn law_detail(&self, law_id: &str, source: &str) -> Result<LawItem, PhaplyError> {
        let url = self.endpoint(&["search", "laws", law_id])?;
        self.fetch_json(
            self.request(Method::GET, url)
                .query(&[("source", source)]),
        )
        .await
    }

    /// `POST /search/laws/{id}/save`: bookmark a law and open a law-detail
    /// session for it in one round trip.
    pub async fn save_law_with_session(
        &self,
        law_id: &str,
    ) -> Result<SaveLawSessionResponse, PhaplyError> {
        let url = self.endpoint(&["search", "laws", law_id, "save"])?;
        self.fetch_json(self.request(Method::POST, url)).await
    }

    // --- Tracking ---

    /// `POST /tracking/laws/save`.
    pub async fn save_law(&self, request: &SaveLawRequest) -> Result<SavedLaw, PhaplyError> {
        let url = self.endpoint(&["tracking", "laws", "save"])?;
        self.fetch_json(self.request(Method::POST, url).json(request))
            .await
    }

    /// `DELETE /tracking/laws/{id}/unsave`.
    pub async fn unsave_law(&self, law_id: &str) -> Result<(), PhaplyError> {
        let url = self.endpoint(&["tracking", "laws", law_id, "unsave"])?;
        self.fetch_unit(self.request(Method::DELETE, url)).await
    }

    /// `GET /tracking/laws/is-saved/{id}`.
    pub async fn is_law_saved(&self, law_id: &str) -> Result<bool, PhaplyError> {
        let url = self.endpoint(&["tracking", "laws", "is-saved", law_id])?;
        let response: IsSavedResponse = self.fetch_json(self.request(Method::GET, url)).await?;
        Ok(response.is_saved)
    }

    /// `GET /tracking/laws`.
    pub async fn saved_laws(&self, skip: u32, limit: u32) -> Result<Vec<SavedLaw>, PhaplyError> {
        let url = self.endpoint(&["tracking", "laws"])?;
        self.fetch_json(
            self.request(Method::GET, url)
                .query(&[("skip", skip), ("limit", limit)]),
        )
        .await
    }

    /// `POST /tracking/questions`.
    pub async fn save_question(
        &self,
        request: &SaveQuestionRequest,
    ) -> Result<SavedQuestion, PhaplyError> {
        let url = self.endpoint(&["tracking", "questions"])?;
        self.fetch_json(self.request(Method::POST, url).json(request))
            .await
    }

    /// `PUT /tracking/questions/{id}`.
    pub async fn update_question(
        &self,
        question_id: i64,
        request: &UpdateQuestionRequest,
    ) -> Result<SavedQuestion, PhaplyError> {
        let url = self.endpoint(&["tracking", "questions", &question_id.to_string()])?;
        self.fetch_json(self.request(Method::PUT, url).json(request))
            .await
    }

    /// `DELETE /tracking/questions/{id}`.
    pub async fn delete_question(&self, question_id: i64) -> Result<(), PhaplyError> {
        let url = self.endpoint(&["tracking", "questions", &question_id.to_string()])?;
        self.fetch_unit(self.request(Method::DELETE, url)).await
    }

    /// `GET /tracking/questions`.
    pub async fn saved_questions(
        &self,
        law_id: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<SavedQuestion>, PhaplyError> {
        let url = self.endpoint(&["tracking", "questions"])?;
        let mut query = vec![("skip", skip.to_string()), ("limit", limit.to_string())];
        if let Some(law_id) = law_id {
            query.push(("law_id", law_id.to_string()));
        }
        self.fetch_json(self.request(Method::GET, url).query(&query))
            .await
    }

    /// `GET /tracking/laws/{id}/questions`.
    pub async fn questions_for_law(
        &self,
        law_id: &str,
    ) -> Result<Vec<SavedQuestion>, PhaplyError> {
        let url = self.endpoint(&["tracking", "laws", law_id, "questions"])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }

    /// `GET /tracking/stats`.
    pub async fn tracking_stats(&self) -> Result<TrackingStats, PhaplyError> {
        let url = self.endpoint(&["tracking", "stats"])?;
        self.fetch_json(self.request(Method::GET, url)).await
    }
}
