// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the phaply stores.
//!
//! Everything here mirrors backend-owned records; ids and timestamps are
//! server-assigned and carried opaquely (`i64` ids, RFC-3339 strings).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which side of the conversation produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Whether a conversation is grounded in one specific statute article
/// ("law-detail") or unconstrained ("general").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContextType {
    General,
    LawDetail,
}

impl Default for ContextType {
    fn default() -> Self {
        ContextType::General
    }
}

/// One turn in a conversation.
///
/// Messages are append-only within a session; list order is insertion
/// order and matches conversation chronology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier. Present on assistant messages once the
    /// backend has persisted them; user messages are appended optimistically
    /// and never carry an id.
    #[serde(default)]
    pub id: Option<i64>,
    pub sender: Sender,
    /// Plain text for user messages; markdown-capable for assistant answers.
    pub text: String,
    /// Citations the answer was derived from. Empty for user messages.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: None,
            sender: Sender::User,
            text: text.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(id: Option<i64>, text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text: text.into(),
            sources,
        }
    }
}

/// A statute document as returned by search and law-detail endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LawItem {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub articles: Vec<String>,
}

/// A bookmarked law, owned by the backend and mirrored in the tracking store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLaw {
    pub id: i64,
    pub law_id: String,
    pub law_title: String,
    #[serde(default)]
    pub law_type: Option<String>,
    #[serde(default)]
    pub law_year: Option<String>,
    #[serde(default)]
    pub law_authority: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    pub created_at: String,
}

/// A bookmarked question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuestion {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub law_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_bookmarked: bool,
    pub created_at: String,
}

/// Summary of a persisted chat session, as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub session_type: ContextType,
    #[serde(default)]
    pub law_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: String,
}

/// Aggregate bookmark and session counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingStats {
    pub total_saved_laws: i64,
    pub total_saved_questions: i64,
    pub total_sessions: i64,
    #[serde(default)]
    pub recent_sessions: Vec<SessionSummary>,
}

/// The authenticated user, as reported by `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}
