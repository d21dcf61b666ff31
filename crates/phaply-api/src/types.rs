// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire DTOs for the backend REST API.
//!
//! Request bodies serialize exactly what the backend expects; response
//! structs declare only the fields the client consumes.

use phaply_core::{ContextType, LawItem};
use serde::{Deserialize, Serialize};

// --- Auth ---

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

// --- Chat ---

/// Body of `POST /chat/send`.
#[derive(Debug, Serialize)]
pub struct QueryInput {
    pub query: String,
    pub session_id: Option<i64>,
    pub context_type: ContextType,
    pub law_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub session_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SessionStartResponse {
    pub id: i64,
    pub session_type: ContextType,
    #[serde(default)]
    pub law_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One stored message inside a session history response.
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub id: i64,
    pub sender: phaply_core::Sender,
    /// The backend names the body field `message`, not `text`.
    pub message: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SessionHistory {
    pub id: i64,
    pub session_type: ContextType,
    #[serde(default)]
    pub law_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub messages: Vec<HistoryMessage>,
}

// --- Search ---

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<LawItem>,
    pub total: i64,
}

/// Query parameters of `POST /search/search`. `None` filters are omitted.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub keyword: String,
    pub mode: String,
    pub type_filter: Option<String>,
    pub year_filter: Option<String>,
    pub authority_filter: Option<String>,
    pub article_filter: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct SaveLawSessionResponse {
    pub saved_law_id: i64,
    #[serde(default)]
    pub slug: Option<String>,
    pub session_id: i64,
}

// --- Tracking ---

/// Body of `POST /tracking/laws/save`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveLawRequest {
    pub law_id: String,
    pub law_title: String,
    pub law_type: Option<String>,
    pub law_year: Option<String>,
    pub law_authority: Option<String>,
    pub law_content: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IsSavedResponse {
    pub is_saved: bool,
}

/// Body of `POST /tracking/questions`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveQuestionRequest {
    pub question: String,
    pub answer: Option<String>,
    pub law_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /tracking/questions/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuestionRequest {
    pub answer: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_bookmarked: Option<bool>,
}

// --- Errors ---

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}
