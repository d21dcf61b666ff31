// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated HTTP binding to the phaply backend REST API.
//!
//! All backend interaction is plain request/response over HTTP+JSON
//! (except login, which is form-encoded), bearer-token authenticated
//! after login. The stores in the sibling crates own all state; this
//! crate is a stateless wrapper apart from the swappable token.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    ChatResponse, HistoryMessage, QueryInput, RegisterRequest, SaveLawRequest,
    SaveLawSessionResponse, SaveQuestionRequest, SearchParams, SearchResponse, SessionHistory,
    SessionStartResponse, UpdateQuestionRequest,
};
