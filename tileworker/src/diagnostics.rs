//! Diagnostics sink.
//!
//! The worker reports protocol misuse as warnings and draw or handler
//! failures as errors. The default [`TracingDiagnostics`] forwards both to
//! `tracing`; hosts can plug in their own sink to surface them elsewhere.

use crate::error::WorkerError;
use tracing::{error, warn};

/// Receives failures absorbed at the worker's message boundary.
///
/// Implementations must not panic; they are called from inside the worker
/// loop.
pub trait Diagnostics: Send + Sync + 'static {
    /// A recoverable protocol problem (unknown kind, busy rejection, bad payload).
    fn warn(&self, error: &WorkerError);

    /// A failed draw or extension handler.
    fn error(&self, error: &WorkerError);
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, err: &WorkerError) {
        match err {
            WorkerError::UnknownMessage { kind } => {
                warn!(kind = %kind, "Unknown message type");
            }
            WorkerError::Busy { active, rejected } => {
                warn!(active = %active, rejected = %rejected, "Tile drawing is already in progress");
            }
            other => warn!(error = %other, "Message rejected"),
        }
    }

    fn error(&self, err: &WorkerError) {
        match err {
            WorkerError::Draw { key, source } => {
                error!(url = %key, error = %source, "Error while drawing");
            }
            other => error!(error = %other, "Message handling failed"),
        }
    }
}
