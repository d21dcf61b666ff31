// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking store: mirrors the server-side bookmark collections (saved
//! laws, saved questions) and aggregate stats locally.
//!
//! Unlike the consultation store's optimistic appends, every mutation
//! here is pessimistic: the network call runs first and the local cache
//! is updated only after server confirmation, so a failed save leaves no
//! stale local entry.

pub mod busy;

use std::sync::{Arc, Mutex, MutexGuard};

use phaply_api::{ApiClient, SaveLawRequest, SaveQuestionRequest, UpdateQuestionRequest};
use phaply_core::{PhaplyError, SavedLaw, SavedQuestion, TrackingStats};
use tracing::warn;

pub use busy::BusyKeys;

/// Busy-set operation keys.
pub mod op {
    pub const SAVE_LAW: &str = "save_law";
    pub const UNSAVE_LAW: &str = "unsave_law";
    pub const SAVE_QUESTION: &str = "save_question";
    pub const UPDATE_QUESTION: &str = "update_question";
    pub const DELETE_QUESTION: &str = "delete_question";
}

#[derive(Debug, Default)]
struct TrackingState {
    saved_laws: Vec<SavedLaw>,
    saved_questions: Vec<SavedQuestion>,
    questions_for_current_law: Vec<SavedQuestion>,
    stats: Option<TrackingStats>,
}

/// Local mirror of the backend bookmark collections.
pub struct TrackingStore {
    api: Arc<ApiClient>,
    state: Mutex<TrackingState>,
    busy: BusyKeys,
}

impl TrackingStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: Mutex::new(TrackingState::default()),
            busy: BusyKeys::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackingState> {
        // Never held across an await point.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn saved_laws(&self) -> Vec<SavedLaw> {
        self.lock().saved_laws.clone()
    }

    pub fn saved_questions(&self) -> Vec<SavedQuestion> {
        self.lock().saved_questions.clone()
    }

    pub fn questions_for_current_law(&self) -> Vec<SavedQuestion> {
        self.lock().questions_for_current_law.clone()
    }

    pub fn stats(&self) -> Option<TrackingStats> {
        self.lock().stats.clone()
    }

    /// Whether an operation key (see [`op`]) is in flight.
    pub fn is_busy(&self, key: &str) -> bool {
        self.busy.is_busy(key)
    }

    // --- Saved laws ---

    /// Bookmarks a law. The new record lands at the head of the local list
    /// only after the server confirms. Errors propagate to the caller.
    pub async fn save_law(&self, request: SaveLawRequest) -> Result<SavedLaw, PhaplyError> {
        let _busy = self.busy.enter(op::SAVE_LAW);
        let record = self.api.save_law(&request).await?;
        self.lock().saved_laws.insert(0, record.clone());
        Ok(record)
    }

    /// Removes a bookmark. The local entry is removed immediately after a
    /// successful delete. Errors propagate to the caller.
    pub async fn unsave_law(&self, law_id: &str) -> Result<(), PhaplyError> {
        let _busy = self.busy.enter(op::UNSAVE_LAW);
        self.api.unsave_law(law_id).await?;
        self.lock().saved_laws.retain(|law| law.law_id != law_id);
        Ok(())
    }

    pub async fn check_law_saved(&self, law_id: &str) -> Result<bool, PhaplyError> {
        self.api.is_law_saved(law_id).await
    }

    /// Refreshes the saved-law list. Failures are logged, never propagated.
    pub async fn load_saved_laws(&self, skip: u32, limit: u32) {
        match self.api.saved_laws(skip, limit).await {
            Ok(laws) => self.lock().saved_laws = laws,
            Err(e) => warn!(error = %e, "failed to load saved laws"),
        }
    }

    // --- Saved questions ---

    /// Bookmarks a question/answer pair. Errors propagate to the caller.
    pub async fn save_question(
        &self,
        question: &str,
        answer: Option<&str>,
        law_id: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<SavedQuestion, PhaplyError> {
        let _busy = self.busy.enter(op::SAVE_QUESTION);
        let record = self
            .api
            .save_question(&SaveQuestionRequest {
                question: question.to_string(),
                answer: answer.map(str::to_string),
                law_id: law_id.map(str::to_string),
                tags,
            })
            .await?;
        self.lock().saved_questions.insert(0, record.clone());
        Ok(record)
    }

    /// Updates a saved question and replaces it in both local lists.
    /// Errors propagate to the caller.
    pub async fn update_question(
        &self,
        question_id: i64,
        request: UpdateQuestionRequest,
    ) -> Result<SavedQuestion, PhaplyError> {
        let _busy = self.busy.enter(op::UPDATE_QUESTION);
        let record = self.api.update_question(question_id, &request).await?;

        let mut guard = self.lock();
        let state = &mut *guard;
        for list in [
            &mut state.saved_questions,
            &mut state.questions_for_current_law,
        ] {
            for entry in list.iter_mut() {
                if entry.id == question_id {
                    *entry = record.clone();
                }
            }
        }
        Ok(record)
    }

    /// Deletes a saved question and drops it from both local lists.
    /// Errors propagate to the caller.
    pub async fn delete_question(&self, question_id: i64) -> Result<(), PhaplyError> {
        let _busy = self.busy.enter(op::DELETE_QUESTION);
        self.api.delete_question(question_id).await?;

        let mut state = self.lock();
        state.saved_questions.retain(|q| q.id != question_id);
        state
            .questions_for_current_law
            .retain(|q| q.id != question_id);
        Ok(())
    }

    /// Refreshes the saved-question list. Failures are logged, never
    /// propagated.
    pub async fn load_saved_questions(&self, law_id: Option<&str>, skip: u32, limit: u32) {
        match self.api.saved_questions(law_id, skip, limit).await {
            Ok(questions) => self.lock().saved_questions = questions,
            Err(e) => warn!(error = %e, "failed to load saved questions"),
        }
    }

    /// Loads the questions attached to one law. Failures are logged.
    pub async fn load_questions_for_law(&self, law_id: &str) {
        match self.api.questions_for_law(law_id).await {
            Ok(questions) => self.lock().questions_for_current_law = questions,
            Err(e) => warn!(error = %e, law_id, "failed to load questions for law"),
        }
    }

    pub fn clear_questions_for_current_law(&self) {
        self.lock().questions_for_current_law.clear();
    }

    // --- Stats ---

    /// Refreshes the aggregate stats. Failures are logged, never propagated.
    pub async fn load_stats(&self) {
        match self.api.tracking_stats().await {
            Ok(stats) => self.lock().stats = Some(stats),
            Err(e) => warn!(error = %e, "failed to load tracking stats"),
        }
    }
}
