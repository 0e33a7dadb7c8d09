//! Shared coordination state for one search
//!
//! The only state mutated by more than one thread:
//! - `attempts`: monotonically increasing counter, one `fetch_add` per batch
//! - `result` + `found`: write-once slot, first publisher wins
//! - `cancelled`: raised on success, on interrupt, or by the coordinator
//!
//! `result` is filled before `found` is raised (release/acquire), so a
//! reader that sees `found == true` always sees the discovery.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

/// A successful candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The recovered password
    pub password: String,

    /// Shared attempt counter at the time of discovery (best effort)
    pub attempts: u64,

    /// Worker that found it
    pub worker: usize,
}

/// Found flag, result slot, cancellation flag and attempt counter
#[derive(Debug, Default)]
pub struct SearchState {
    found: AtomicBool,
    result: OnceLock<Discovery>,
    cancelled: AtomicBool,
    attempts: AtomicU64,
}

impl SearchState {
    /// Create a fresh state for one search
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished batch to the shared counter, returning the new total
    pub fn record_attempts(&self, count: u64) -> u64 {
        self.attempts.fetch_add(count, Ordering::Relaxed) + count
    }

    /// Current attempt total
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Publish a discovery; returns false if another worker already won
    ///
    /// Also raises cancellation so every worker stops at its next batch.
    pub fn publish(&self, discovery: Discovery) -> bool {
        let won = self.result.set(discovery).is_ok();
        if won {
            self.found.store(true, Ordering::Release);
        }
        self.cancel();
        won
    }

    /// True once a password has been published
    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// The published discovery, if any
    pub fn discovery(&self) -> Option<&Discovery> {
        if self.is_found() {
            self.result.get()
        } else {
            None
        }
    }

    /// Ask all workers to stop at their next batch boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Workers poll this between batches
    pub fn should_stop(&self) -> bool {
        self.is_found() || self.is_cancelled()
    }
}
