// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The consultation session store.
//!
//! Orchestrates the life of one chat session and its message list:
//! session identity, context type (general vs. law-detail), optimistic
//! message appends, lazy session materialization, and recovery from
//! transport failures without corrupting message order.

use std::sync::{Arc, Mutex, MutexGuard};

use phaply_api::{ApiClient, ChatResponse, QueryInput};
use phaply_core::{ChatMessage, ContextType, LatestGate, PhaplyError, SessionSummary, StalePolicy};
use tracing::{debug, warn};

/// Separator line inserted between a question and its grounding text.
const GROUNDING_HEADER: &str = "Dựa trên văn bản sau:";

/// Fixed assistant-visible message appended when a send fails.
pub const SEND_ERROR_MESSAGE: &str = "Có lỗi khi kết nối AI. Vui lòng thử lại!";

#[derive(Debug, Default)]
struct ConsultState {
    messages: Vec<ChatMessage>,
    loading: bool,
    current_session_id: Option<i64>,
    context_type: ContextType,
    current_law_id: Option<String>,
}

/// Manages one active chat session.
///
/// Messages are appended optimistically: the user's question is visible
/// before any network call, and a failed send substitutes a fixed error
/// message instead of rolling the question back. The store does not
/// enforce mutual exclusion between overlapping sends; callers are
/// expected to disable the send control while [`is_loading`] is true.
///
/// [`is_loading`]: ConsultationStore::is_loading
pub struct ConsultationStore {
    api: Arc<ApiClient>,
    state: Mutex<ConsultState>,
    history_gate: LatestGate,
}

impl ConsultationStore {
    pub fn new(api: Arc<ApiClient>, stale_policy: StalePolicy) -> Self {
        Self {
            api,
            state: Mutex::new(ConsultState::default()),
            history_gate: LatestGate::new(stale_policy),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConsultState> {
        // Never held across an await point.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current message list, in conversation order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn current_session_id(&self) -> Option<i64> {
        self.lock().current_session_id
    }

    pub fn context_type(&self) -> ContextType {
        self.lock().context_type
    }

    pub fn current_law_id(&self) -> Option<String> {
        self.lock().current_law_id.clone()
    }

    /// Starts a new session for the given context, replacing the active one.
    ///
    /// May be called repeatedly; each call clears the message list and
    /// stores the requested context. On failure the session stays
    /// unmaterialized (`current_session_id` remains `None`) and the next
    /// [`send_message`] lazily retries initialization with the stored
    /// context. The failure is logged, not surfaced.
    ///
    /// [`send_message`]: ConsultationStore::send_message
    pub async fn init_session(&self, context_type: ContextType, law_id: Option<&str>) {
        {
            let mut state = self.lock();
            state.messages.clear();
            state.current_session_id = None;
            state.context_type = context_type;
            state.current_law_id = law_id.map(str::to_string);
        }

        match self.api.start_session(context_type, law_id).await {
            Ok(session) => {
                debug!(session_id = session.id, context = %context_type, "session started");
                self.lock().current_session_id = Some(session.id);
            }
            Err(e) => {
                warn!(error = %e, context = %context_type, "failed to init session");
            }
        }
    }

    /// Sends a question and appends the answer.
    ///
    /// `text` must be non-empty after trimming; blank input is rejected by
    /// the caller before invocation, not here. `context` is extra document
    /// text appended to the question as grounding material (law-detail
    /// chats). `law_id` overrides the stored law id when no session exists
    /// yet.
    ///
    /// The resulting message order is always
    /// `[..., user-message, assistant-message-or-error]`.
    pub async fn send_message(&self, text: &str, context: Option<&str>, law_id: Option<&str>) {
        // Optimistic append before any network call: the question stays
        // visible even if the network fails.
        let (context_type, session_id, stored_law_id) = {
            let mut state = self.lock();
            state.messages.push(ChatMessage::user(text));
            state.loading = true;
            (
                state.context_type,
                state.current_session_id,
                state.current_law_id.clone(),
            )
        };

        let result = self
            .round_trip(text, context, law_id, context_type, session_id, stored_law_id)
            .await;

        // Runs on both paths: the assistant (or error) message lands and
        // loading is cleared no matter what happened above.
        let mut state = self.lock();
        match result {
            Ok(response) => {
                state.messages.push(ChatMessage::assistant(
                    Some(response.message_id),
                    response.answer,
                    response.sources,
                ));
                state.current_session_id = Some(response.session_id);
            }
            Err(e) => {
                warn!(error = %e, "chat send failed");
                state
                    .messages
                    .push(ChatMessage::assistant(None, SEND_ERROR_MESSAGE, Vec::new()));
            }
        }
        state.loading = false;
    }

    async fn round_trip(
        &self,
        text: &str,
        context: Option<&str>,
        law_id: Option<&str>,
        context_type: ContextType,
        session_id: Option<i64>,
        stored_law_id: Option<String>,
    ) -> Result<ChatResponse, PhaplyError> {
        // Lazily materialize a session if none exists yet, so a failed
        // init_session does not wedge the conversation.
        let session_id = match session_id {
            Some(id) => id,
            None => {
                let requested_law = law_id
                    .map(str::to_string)
                    .or_else(|| stored_law_id.clone());
                let session = self
                    .api
                    .start_session(context_type, requested_law.as_deref())
                    .await?;
                debug!(session_id = session.id, "session materialized lazily");
                self.lock().current_session_id = Some(session.id);
                session.id
            }
        };

        let query = match context {
            Some(grounding) => format!("{text}\n\n{GROUNDING_HEADER}\n{grounding}"),
            None => text.to_string(),
        };

        let effective_law = stored_law_id.or_else(|| law_id.map(str::to_string));

        self.api
            .send_message(&QueryInput {
                query,
                session_id: Some(session_id),
                context_type,
                law_id: effective_law,
            })
            .await
    }

    /// Fetches a previous session's full message list and replaces local
    /// state wholesale (a full overwrite, not a merge). The backend's view
    /// wins on any conflict with local state.
    pub async fn load_session_history(&self, session_id: i64) {
        let ticket = self.history_gate.issue();

        match self.api.session_history(session_id).await {
            Ok(history) => {
                if !self.history_gate.admit(ticket) {
                    debug!(session_id, "discarding stale history response");
                    return;
                }

                let messages = history
                    .messages
                    .into_iter()
                    .map(|m| ChatMessage {
                        id: Some(m.id),
                        sender: m.sender,
                        text: m.message,
                        sources: m.sources.unwrap_or_default(),
                    })
                    .collect();

                let mut state = self.lock();
                state.messages = messages;
                state.current_session_id = Some(history.id);
                state.context_type = history.session_type;
                state.current_law_id = history.law_id;
            }
            Err(e) => {
                warn!(error = %e, session_id, "failed to load session history");
            }
        }
    }

    /// Clears the message list only, keeping the session id and context.
    /// Used when the discussed article changes without destroying the
    /// session. Idempotent.
    pub fn reset_messages(&self) {
        self.lock().messages.clear();
    }

    /// Lists the user's persisted sessions. Errors propagate to the caller.
    pub async fn list_sessions(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<SessionSummary>, PhaplyError> {
        self.api.list_sessions(skip, limit).await
    }

    /// Deletes a persisted session. Errors propagate to the caller.
    pub async fn delete_session(&self, session_id: i64) -> Result<(), PhaplyError> {
        self.api.delete_session(session_id).await?;
        let mut state = self.lock();
        if state.current_session_id == Some(session_id) {
            // The backend destroyed the active thread; drop the local mirror.
            state.current_session_id = None;
            state.messages.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phaply_core::Sender;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server_uri: &str) -> ConsultationStore {
        let api = Arc::new(ApiClient::new(server_uri, Duration::from_secs(5)).unwrap());
        ConsultationStore::new(api, StalePolicy::Discard)
    }

    async fn mount_start(server: &MockServer, session_id: i64) {
        Mock::given(method("POST"))
            .and(path("/chat/session/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": session_id, "session_type": "general"
            })))
            .mount(server)
            .await;
    }

    async fn mount_send(server: &MockServer, session_id: i64, answer: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": answer,
                "sources": ["Điều 90 Bộ luật Lao động 2019"],
                "session_id": session_id,
                "message_id": 41
            })))
            .mount(server)
            .await;
    }

    /// Successful sends alternate user-then-assistant in call order.
    #[tokio::test]
    async fn message_ordering_invariant() {
        let server = MockServer::start().await;
        mount_start(&server, 1).await;
        mount_send(&server, 1, "Trả lời").await;

        let store = store_for(&server.uri());
        store.send_message("Câu hỏi thứ nhất?", None, None).await;
        store.send_message("Câu hỏi thứ hai?", None, None).await;

        let messages = store.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "Câu hỏi thứ nhất?");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[2].sender, Sender::User);
        assert_eq!(messages[2].text, "Câu hỏi thứ hai?");
        assert_eq!(messages[3].sender, Sender::Assistant);
        assert!(!store.is_loading());
    }

    /// A failed send keeps the user's message, appends the fixed error
    /// message, and clears the loading flag.
    #[tokio::test]
    async fn optimistic_append_survives_failure() {
        let server = MockServer::start().await;
        mount_start(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.send_message("Câu hỏi?", None, None).await;

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "Câu hỏi?");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].text, SEND_ERROR_MESSAGE);
        assert!(messages[1].sources.is_empty());
        assert!(!store.is_loading());
    }

    /// Switching context leaves no residual state from the previous one.
    #[tokio::test]
    async fn session_context_isolation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/session/start"))
            .and(query_param("session_type", "law-detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 5, "session_type": "law-detail", "law_id": "Điều 5"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/session/start"))
            .and(query_param("session_type", "general"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 6, "session_type": "general"
            })))
            .mount(&server)
            .await;
        mount_send(&server, 5, "Về Điều 5").await;

        let store = store_for(&server.uri());
        store
            .init_session(ContextType::LawDetail, Some("Điều 5"))
            .await;
        store.send_message("Điều 5 quy định gì?", None, None).await;
        assert!(!store.messages().is_empty());

        store.init_session(ContextType::General, None).await;

        assert!(store.messages().is_empty());
        assert_eq!(store.current_law_id(), None);
        assert_eq!(store.context_type(), ContextType::General);
        assert_eq!(store.current_session_id(), Some(6));
    }

    /// reset_messages twice is the same as once.
    #[tokio::test]
    async fn reset_messages_is_idempotent() {
        let server = MockServer::start().await;
        mount_start(&server, 1).await;
        mount_send(&server, 1, "Trả lời").await;

        let store = store_for(&server.uri());
        store.send_message("Câu hỏi?", None, None).await;
        let session = store.current_session_id();

        store.reset_messages();
        assert!(store.messages().is_empty());
        store.reset_messages();
        assert!(store.messages().is_empty());
        // The session id survives a message reset.
        assert_eq!(store.current_session_id(), session);
    }

    /// With no active session, a send lazily starts one with the stored
    /// law id and routes the send through the returned session id.
    #[tokio::test]
    async fn send_materializes_session_lazily() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/session/start"))
            .and(query_param("session_type", "law-detail"))
            .and(query_param("law_id", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 99, "session_type": "law-detail", "law_id": "5"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .and(body_partial_json(serde_json::json!({
                "session_id": 99,
                "context_type": "law-detail",
                "law_id": "5"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "Điều 5 quy định quyền của người lao động.",
                "sources": ["Điều 5 Bộ luật Lao động 2019"],
                "session_id": 99,
                "message_id": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Precondition: law-detail context with no materialized session,
        // as left behind by a failed init_session.
        let store = store_for(&server.uri());
        {
            let mut state = store.lock();
            state.context_type = ContextType::LawDetail;
            state.current_law_id = None;
        }

        store
            .send_message("Điều 5 quy định gì?", None, Some("5"))
            .await;

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].text, "Điều 5 quy định quyền của người lao động.");
        assert_eq!(messages[1].sources, vec!["Điều 5 Bộ luật Lao động 2019"]);
        assert_eq!(store.current_session_id(), Some(99));
        assert!(!store.is_loading());
    }

    /// Grounding text is appended to the question after the fixed header.
    #[tokio::test]
    async fn grounding_context_is_appended_to_the_query() {
        let server = MockServer::start().await;
        mount_start(&server, 2).await;
        Mock::given(method("POST"))
            .and(path("/chat/send"))
            .and(body_partial_json(serde_json::json!({
                "query": "Mức lương tối thiểu?\n\nDựa trên văn bản sau:\nĐiều 91. Mức lương tối thiểu..."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "Theo Điều 91...",
                "sources": [],
                "session_id": 2,
                "message_id": 8
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store
            .send_message(
                "Mức lương tối thiểu?",
                Some("Điều 91. Mức lương tối thiểu..."),
                None,
            )
            .await;

        assert_eq!(store.messages()[1].text, "Theo Điều 91...");
    }

    /// A slow history response must not clobber a newer one.
    #[tokio::test]
    async fn stale_history_response_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/history/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(200))
                    .set_body_json(serde_json::json!({
                        "id": 1, "session_type": "general",
                        "messages": [{"id": 1, "sender": "user", "message": "cũ"}]
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chat/history/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2, "session_type": "general",
                "messages": [{"id": 2, "sender": "user", "message": "mới"}]
            })))
            .mount(&server)
            .await;

        let store = Arc::new(store_for(&server.uri()));

        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.load_session_history(1).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.load_session_history(2).await;
        slow.await.unwrap();

        assert_eq!(store.current_session_id(), Some(2));
        assert_eq!(store.messages()[0].text, "mới");
    }

    /// History load replaces state wholesale, not merged with local state.
    #[tokio::test]
    async fn history_load_is_a_full_overwrite() {
        let server = MockServer::start().await;
        mount_start(&server, 1).await;
        mount_send(&server, 1, "Trả lời").await;
        Mock::given(method("GET"))
            .and(path("/chat/history/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7, "session_type": "law-detail", "law_id": "Điều 5",
                "messages": [
                    {"id": 10, "sender": "user", "message": "Điều 5 quy định gì?"},
                    {"id": 11, "sender": "assistant", "message": "Điều 5...", "sources": ["Điều 5"]}
                ]
            })))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        store.send_message("trước đó", None, None).await;

        store.load_session_history(7).await;

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, Some(10));
        assert_eq!(store.current_session_id(), Some(7));
        assert_eq!(store.context_type(), ContextType::LawDetail);
        assert_eq!(store.current_law_id().as_deref(), Some("Điều 5"));
    }
}
