// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consultation session management for phaply.
//!
//! This crate owns the active chat session: its server identity, its
//! context (general or grounded in one statute article), the accumulated
//! message list, and the protocol for sending a question and receiving
//! an answer with citations.

pub mod store;

pub use store::{ConsultationStore, SEND_ERROR_MESSAGE};
