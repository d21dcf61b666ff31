// SPDX-FileCopyrightText: 2026 Phaply Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stale-response guard for overlapping asynchronous requests.
//!
//! Stores that wholesale-replace a field from a network response (search
//! results, session history) issue a ticket per outgoing request and only
//! apply a response whose ticket is newer than anything applied so far.
//! Without this, a slow earlier request completing after a fast later one
//! would clobber newer state. Requests themselves are never aborted; the
//! gate only discards their effects.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use strum::{Display, EnumString};

/// What to do with a response that arrives out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum StalePolicy {
    /// Apply only the newest response; drop anything superseded.
    Discard,
    /// Apply every response in arrival order (last writer wins).
    LastWins,
}

impl Default for StalePolicy {
    fn default() -> Self {
        StalePolicy::Discard
    }
}

impl StalePolicy {
    /// Parse a config string, rejecting unknown values.
    pub fn parse(s: &str) -> Result<Self, String> {
        StalePolicy::from_str(s)
            .map_err(|_| format!("unknown stale-response policy `{s}` (expected `discard` or `last-wins`)"))
    }
}

/// Monotonic ticket issuer with an applied-watermark.
#[derive(Debug)]
pub struct LatestGate {
    policy: StalePolicy,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl LatestGate {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            policy,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Take a ticket for an outgoing request.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether the response for `ticket` may be applied.
    ///
    /// Under [`StalePolicy::Discard`] a ticket is admitted only if no newer
    /// ticket's response has been applied yet; the watermark advances on
    /// admission. Under [`StalePolicy::LastWins`] every response is admitted.
    pub fn admit(&self, ticket: u64) -> bool {
        let previous = self.applied.fetch_max(ticket, Ordering::SeqCst);
        match self.policy {
            StalePolicy::LastWins => true,
            StalePolicy::Discard => previous < ticket,
        }
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_monotonic() {
        let gate = LatestGate::new(StalePolicy::Discard);
        let a = gate.issue();
        let b = gate.issue();
        assert!(b > a);
    }

    #[test]
    fn discard_drops_out_of_order_response() {
        let gate = LatestGate::new(StalePolicy::Discard);
        let slow = gate.issue();
        let fast = gate.issue();

        // The later request completes first.
        assert!(gate.admit(fast));
        // The earlier request's response must be dropped.
        assert!(!gate.admit(slow));
    }

    #[test]
    fn discard_admits_in_order_responses() {
        let gate = LatestGate::new(StalePolicy::Discard);
        let first = gate.issue();
        let second = gate.issue();
        assert!(gate.admit(first));
        assert!(gate.admit(second));
    }

    #[test]
    fn last_wins_admits_everything() {
        let gate = LatestGate::new(StalePolicy::LastWins);
        let slow = gate.issue();
        let fast = gate.issue();
        assert!(gate.admit(fast));
        assert!(gate.admit(slow));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!(StalePolicy::parse("discard").unwrap(), StalePolicy::Discard);
        assert_eq!(
            StalePolicy::parse("last-wins").unwrap(),
            StalePolicy::LastWins
        );
        assert!(StalePolicy::parse("retry").is_err());
    }
}
