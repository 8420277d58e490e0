//! Atomic counters for worker events.

use super::snapshot::WorkerSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for everything the worker does with a message or a draw.
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    draws_started: AtomicU64,
    draws_completed: AtomicU64,
    draws_empty: AtomicU64,
    draws_failed: AtomicU64,
    draws_cancelled: AtomicU64,
    draws_superseded: AtomicU64,
    draws_aborted: AtomicU64,
    draws_rejected: AtomicU64,
    stale_discarded: AtomicU64,
    extension_messages: AtomicU64,
    unknown_messages: AtomicU64,
    invalid_messages: AtomicU64,
    peak_pending_draws: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_started(&self) {
        self.draws_started.fetch_add(1, Ordering::Relaxed);
    }

    /// A current draw produced bytes.
    pub fn draw_completed(&self) {
        self.draws_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// A current draw produced no content.
    pub fn draw_empty(&self) {
        self.draws_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn draw_failed(&self) {
        self.draws_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A current draw settled with the cancellation outcome.
    pub fn draw_cancelled(&self) {
        self.draws_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn draw_superseded(&self) {
        self.draws_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn draw_aborted(&self) {
        self.draws_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn draw_rejected(&self) {
        self.draws_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_discarded(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn extension_message(&self) {
        self.extension_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_message(&self) {
        self.unknown_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invalid_message(&self) {
        self.invalid_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the number of unsettled draws, keeping the highest seen.
    pub fn pending_draws(&self, count: usize) {
        self.peak_pending_draws.fetch_max(count as u64, Ordering::Relaxed);
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            draws_started: self.draws_started.load(Ordering::Relaxed),
            draws_completed: self.draws_completed.load(Ordering::Relaxed),
            draws_empty: self.draws_empty.load(Ordering::Relaxed),
            draws_failed: self.draws_failed.load(Ordering::Relaxed),
            draws_cancelled: self.draws_cancelled.load(Ordering::Relaxed),
            draws_superseded: self.draws_superseded.load(Ordering::Relaxed),
            draws_aborted: self.draws_aborted.load(Ordering::Relaxed),
            draws_rejected: self.draws_rejected.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
            extension_messages: self.extension_messages.load(Ordering::Relaxed),
            unknown_messages: self.unknown_messages.load(Ordering::Relaxed),
            invalid_messages: self.invalid_messages.load(Ordering::Relaxed),
            peak_pending_draws: self.peak_pending_draws.load(Ordering::Relaxed),
        }
    }
}
