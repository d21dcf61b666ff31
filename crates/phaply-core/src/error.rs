// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the phaply client.

use thiserror::Error;

/// The primary error type used across the phaply workspace.
#[derive(Debug, Error)]
pub enum PhaplyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (connection refused, timeout, body read failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend rejected the request. `detail` carries the server-provided
    /// message verbatim when one was present.
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// Authentication failure (bad credentials, missing or expired token).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PhaplyError {
    /// True for failures caused by an invalid or expired credential,
    /// as opposed to transport or server-side errors.
    pub fn is_auth(&self) -> bool {
        matches!(self, PhaplyError::Auth(_))
    }

    /// The server-provided detail message, when the backend sent one.
    ///
    /// Used by callers that surface validation failures verbatim
    /// (register, save-question, save-law flows).
    pub fn api_detail(&self) -> Option<&str> {
        match self {
            PhaplyError::Api { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
