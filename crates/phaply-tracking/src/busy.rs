// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-operation busy tracking.
//!
//! Replaces a single shared `is_saving` boolean with a set of busy
//! operation keys, so concurrent independent operations (saving a law
//! while saving a question) do not visually block each other.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of operation keys currently in flight.
#[derive(Debug, Default)]
pub struct BusyKeys {
    active: Mutex<HashSet<&'static str>>,
}

impl BusyKeys {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<&'static str>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `key` busy until the returned guard is dropped.
    pub fn enter(&self, key: &'static str) -> BusyGuard<'_> {
        self.lock().insert(key);
        BusyGuard { keys: self, key }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn any_busy(&self) -> bool {
        !self.lock().is_empty()
    }
}

/// Clears its key on drop, including on the error path of a failed call.
pub struct BusyGuard<'a> {
    keys: &'a BusyKeys,
    key: &'static str,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.keys.lock().remove(self.key);
    }
}
