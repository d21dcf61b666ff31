// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the phaply legal-consultation client.
//!
//! This crate provides the shared error type, the domain types mirrored
//! from the backend, and the stale-response gate used by the stores.

pub mod error;
pub mod gate;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PhaplyError;
pub use gate::{LatestGate, StalePolicy};
pub use types::{
    ChatMessage, ContextType, LawItem, SavedLaw, SavedQuestion, Sender, SessionSummary,
    TrackingStats, UserProfile,
};
