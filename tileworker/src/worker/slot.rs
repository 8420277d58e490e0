//! The active slot: the worker's record of its single in-flight draw.
//!
//! Each occupation gets a new generation number. A settling draw carries the
//! generation it was started with; it is only current if the slot still holds
//! that same generation.

use crate::drawer::TileDrawer;
use crate::request::RequestKey;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// The draw currently held by the worker.
struct ActiveDraw {
    generation: u64,
    key: RequestKey,
    drawer: Box<dyn TileDrawer>,
}

/// Holds at most one [`ActiveDraw`].
#[derive(Default)]
pub(crate) struct ActiveSlot {
    current: Option<ActiveDraw>,
    next_generation: u64,
}

impl ActiveSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a draw and return its generation.
    ///
    /// The slot must be empty; callers release or abort the previous draw
    /// first.
    pub fn occupy(&mut self, key: RequestKey, drawer: Box<dyn TileDrawer>) -> u64 {
        debug_assert!(self.current.is_none(), "active slot already occupied");
        let generation = self.next_generation;
        self.next_generation += 1;
        self.current = Some(ActiveDraw {
            generation,
            key,
            drawer,
        });
        generation
    }

    /// Abort the held draw and empty the slot.
    ///
    /// Returns the key of the aborted draw, or `None` if nothing was held.
    /// A drawer that panics in `abort()` is still released.
    pub fn abort_current(&mut self) -> Option<RequestKey> {
        let active = self.current.take()?;
        if panic::catch_unwind(AssertUnwindSafe(|| active.drawer.abort())).is_err() {
            warn!(url = %active.key, "Drawer panicked while aborting");
        }
        Some(active.key)
    }

    /// Release the slot for a settled draw if it is still current.
    ///
    /// Returns the released key, or `None` for a stale generation, leaving the
    /// slot untouched.
    pub fn settle(&mut self, generation: u64) -> Option<RequestKey> {
        if self.is_current(generation) {
            self.current.take().map(|active| active.key)
        } else {
            None
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    pub fn key(&self) -> Option<&RequestKey> {
        self.current.as_ref().map(|active| &active.key)
    }

    pub fn is_occupied(&self) -> bool {
        self.current.is_some()
    }
}
