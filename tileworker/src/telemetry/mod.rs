//! Worker telemetry.
//!
//! Lock-free counters recorded by the worker loop, readable from any thread
//! through a shared [`WorkerMetrics`] handle.
//!
//! ```text
//! TileWorker ─────► WorkerMetrics ─────► WorkerSnapshot ─────► Host
//!                   (atomic counters)    (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let worker = TileWorker::new(factory, TileWorkerConfig::default());
//! let metrics = worker.metrics();
//! worker.install(port, shutdown);
//!
//! let snapshot = metrics.snapshot();
//! println!("Draws completed: {}", snapshot.draws_completed);
//! ```

mod metrics;
mod snapshot;

pub use metrics::WorkerMetrics;
pub use snapshot::WorkerSnapshot;
