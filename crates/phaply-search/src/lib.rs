// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search store: direct keyword-to-results binding against the backend
//! search endpoint, plus law-detail lookups.
//!
//! A blank keyword clears the results without a network call, so the UI
//! can distinguish "no query" from "query with zero results". A failed
//! search also clears the results; the failure is logged, not surfaced
//! as a distinct error state.

use std::sync::{Arc, Mutex, MutexGuard};

use phaply_api::{ApiClient, SaveLawSessionResponse, SearchParams};
use phaply_config::model::SearchConfig;
use phaply_core::{LatestGate, LawItem, PhaplyError, StalePolicy};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct SearchState {
    keyword: String,
    type_filter: Option<String>,
    year_filter: Option<String>,
    authority_filter: Option<String>,
    results: Vec<LawItem>,
}

/// Holds the current keyword/filters and the latest result list.
pub struct SearchStore {
    api: Arc<ApiClient>,
    mode: String,
    limit: u32,
    detail_source: String,
    state: Mutex<SearchState>,
    gate: LatestGate,
}

impl SearchStore {
    pub fn new(api: Arc<ApiClient>, config: &SearchConfig, stale_policy: StalePolicy) -> Self {
        Self {
            api,
            mode: config.mode.clone(),
            limit: config.limit,
            detail_source: config.detail_source.clone(),
            state: Mutex::new(SearchState::default()),
            gate: LatestGate::new(stale_policy),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        // Never held across an await point.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn keyword(&self) -> String {
        self.lock().keyword.clone()
    }

    /// Snapshot of the latest result list.
    pub fn results(&self) -> Vec<LawItem> {
        self.lock().results.clone()
    }

    /// Stores the keyword and refreshes the results.
    pub async fn set_keyword(&self, keyword: impl Into<String>) {
        self.lock().keyword = keyword.into();
        self.filter_results().await;
    }

    pub async fn set_type_filter(&self, value: Option<String>) {
        self.lock().type_filter = value;
        self.filter_results().await;
    }

    pub async fn set_year_filter(&self, value: Option<String>) {
        self.lock().year_filter = value;
        self.filter_results().await;
    }

    pub async fn set_authority_filter(&self, value: Option<String>) {
        self.lock().authority_filter = value;
        self.filter_results().await;
    }

    /// Re-runs the search for the current keyword and filters.
    pub async fn filter_results(&self) {
        let (keyword, type_filter, year_filter, authority_filter) = {
            let state = self.lock();
            (
                state.keyword.clone(),
                state.type_filter.clone(),
                state.year_filter.clone(),
                state.authority_filter.clone(),
            )
        };

        let ticket = self.gate.issue();

        if keyword.trim().is_empty() {
            // No query: clear locally. Claim the ticket so any search still
            // in flight lands stale instead of repopulating the cleared list.
            self.gate.admit(ticket);
            self.lock().results.clear();
            return;
        }

        let params = SearchParams {
            keyword,
            mode: self.mode.clone(),
            type_filter,
            year_filter,
            authority_filter,
            article_filter: None,
            limit: self.limit,
        };

        match self.api.search(&params).await {
            Ok(response) => {
                if self.gate.admit(ticket) {
                    debug!(total = response.total, "search results replaced");
                    self.lock().results = response.results;
                } else {
                    debug!("discarding stale search response");
                }
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                if self.gate.admit(ticket) {
                    self.lock().results.clear();
                }
            }
        }
    }

    /// Fetches one statute's full detail. Errors propagate to the caller.
    pub async fn law_detail(&self, law_id: &str) -> Result<LawItem, PhaplyError> {
        self.api.law_detail(law_id, &self.detail_source).await
    }

    /// Bookmarks a law and opens a law-detail session for it in one round
    /// trip. Errors propagate to the caller.
    pub async fn save_law_and_start_session(
        &self,
        law_id: &str,
    ) -> Result<SaveLawSessionResponse, PhaplyError> {
        self.api.save_law_with_session(law_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server_uri: &str) -> SearchStore {
        let api = Arc::new(ApiClient::new(server_uri, Duration::from_secs(5)).unwrap());
        SearchStore::new(api, &SearchConfig::default(), StalePolicy::Discard)
    }

    fn law(title: &str) -> serde_json::Value {
        serde_json::json!({"id": title, "title": title, "type": "Luật"})
    }

    /// A blank keyword clears results without touching the network.
    #[tokio::test]
    async fn blank_keyword_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [law("Bộ luật Lao động")], "total": 1
            })))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.set_keyword("lao động").await;
        assert_eq!(store.results().len(), 1);

        store.set_keyword("").await;
        assert!(store.results().is_empty());

        // Exactly one request: the blank keyword never hit the backend.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    /// Search failures empty the result set; no error state is surfaced.
    #[tokio::test]
    async fn failure_clears_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("keyword", "đầu tư"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [law("Luật Đầu tư")], "total": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("keyword", "hỏng"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.set_keyword("đầu tư").await;
        assert_eq!(store.results().len(), 1);

        store.set_keyword("hỏng").await;
        assert!(store.results().is_empty());
    }

    /// The configured mode and limit ride along on every search.
    #[tokio::test]
    async fn search_uses_configured_mode_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("mode", "fast"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [], "total": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.set_keyword("thuế").await;
    }

    /// Changing a filter re-runs the search with the filter applied.
    #[tokio::test]
    async fn filter_change_refreshes_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("type_filter", "Nghị định"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [law("Nghị định 145/2020")], "total": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [law("Bộ luật Lao động"), law("Nghị định 145/2020")], "total": 2
            })))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.set_keyword("lao động").await;
        assert_eq!(store.results().len(), 2);

        store
            .set_type_filter(Some("Nghị định".to_string()))
            .await;
        assert_eq!(store.results().len(), 1);
        assert_eq!(store.results()[0].title, "Nghị định 145/2020");
    }

    /// A slow earlier search must not clobber a newer one's results.
    #[tokio::test]
    async fn stale_search_response_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("keyword", "chậm"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(200))
                    .set_body_json(serde_json::json!({
                        "results": [law("Kết quả cũ")], "total": 1
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .and(query_param("keyword", "nhanh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [law("Kết quả mới")], "total": 1
            })))
            .mount(&server)
            .await;

        let store = Arc::new(store_for(&server.uri()));

        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.set_keyword("chậm").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.set_keyword("nhanh").await;
        slow.await.unwrap();

        let results = store.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Kết quả mới");
    }

    /// An in-flight search must not repopulate a list the user has cleared.
    #[tokio::test]
    async fn blank_keyword_invalidates_in_flight_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(200))
                    .set_body_json(serde_json::json!({
                        "results": [law("Muộn")], "total": 1
                    })),
            )
            .mount(&server)
            .await;

        let store = Arc::new(store_for(&server.uri()));

        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.set_keyword("muộn").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.set_keyword("").await;
        slow.await.unwrap();

        assert!(store.results().is_empty());
    }
}
