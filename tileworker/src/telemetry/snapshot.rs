//! Point-in-time copy of worker counters.

/// Plain copy of [`WorkerMetrics`](super::WorkerMetrics) counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSnapshot {
    pub draws_started: u64,
    /// Current draws that delivered bytes.
    pub draws_completed: u64,
    /// Current draws that delivered `null`.
    pub draws_empty: u64,
    pub draws_failed: u64,
    /// Current draws that settled as aborted without being superseded.
    pub draws_cancelled: u64,
    pub draws_superseded: u64,
    /// Draws cleared by a `draw:abort` message.
    pub draws_aborted: u64,
    /// Draws refused under the reject busy policy.
    pub draws_rejected: u64,
    /// Settlements ignored because their draw was no longer current.
    pub stale_discarded: u64,
    pub extension_messages: u64,
    pub unknown_messages: u64,
    /// Messages whose payload failed to decode.
    pub invalid_messages: u64,
    /// Most draws left unsettled at once, superseded ones included.
    pub peak_pending_draws: u64,
}

impl WorkerSnapshot {
    /// Number of `draw:result` messages emitted.
    pub fn results_emitted(&self) -> u64 {
        self.draws_completed + self.draws_empty
    }

    /// Draws that have settled or been released from the slot.
    pub fn draws_finished(&self) -> u64 {
        self.results_emitted()
            + self.draws_failed
            + self.draws_cancelled
            + self.draws_superseded
            + self.draws_aborted
    }

    /// Draws started but not yet finished, 0 or 1 for a healthy worker.
    pub fn draws_in_flight(&self) -> u64 {
        self.draws_started.saturating_sub(self.draws_finished())
    }
}
