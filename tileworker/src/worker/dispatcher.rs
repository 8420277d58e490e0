//! The tile worker.
//!
//! [`TileWorker`] is a single-flight dispatcher: it owns at most one draw at a
//! time, hands out results only for the draw it still holds, and keeps taking
//! messages while a draw is pending.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           TileWorker                              │
//! │                                                                   │
//! │ InboundMessage ──► ┌──────────┐                                   │
//! │                    │  Decode  │──► draw ──► busy? ─► Reject: warn │
//! │                    └────┬─────┘               │                   │
//! │                         │                     └─► Supersede:      │
//! │                         │                          abort held     │
//! │                         │                     ▼                   │
//! │                         │               Factory ──► ActiveSlot    │
//! │                         │                     │                   │
//! │                         │                     ▼                   │
//! │                         │               pending draws             │
//! │                         │                     │ settles           │
//! │                         │                     ▼                   │
//! │                         │       generation still current?         │
//! │                         │          yes ──► draw:result            │
//! │                         │          no  ──► discard                │
//! │                         ├──► draw:abort ──► abort held, ack       │
//! │                         └──► other ──► MessageHandlers / warn     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tileworker::{worker_channel, InboundMessage, TileWorker, TileWorkerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = TileWorkerConfig::default();
//! let (mut host, port) = worker_channel(config.channel_capacity);
//! let shutdown = CancellationToken::new();
//!
//! let handle = TileWorker::new(factory, config).install(port, shutdown.clone());
//!
//! host.send(InboundMessage::draw("https://tiles.example/12/2048/1361.pbf")).await?;
//! let result = host.recv().await;
//!
//! shutdown.cancel();
//! handle.await?;
//! ```

use super::config::{BusyPolicy, TileWorkerConfig};
use super::slot::ActiveSlot;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::drawer::DrawerFactory;
use crate::error::{DrawError, DrawResult, WorkerError};
use crate::handlers::MessageHandlers;
use crate::protocol::{Command, InboundMessage, MessageSink, OutboundMessage, WorkerPort};
use crate::request::{DrawRequest, RequestKey};
use crate::telemetry::WorkerMetrics;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Unsettled draw count at which a warning is logged.
///
/// Superseded draws stay pending until their drawer winds down, so a drawer
/// that ignores `abort()` makes this set grow.
pub const PENDING_DRAWS_WARN_THRESHOLD: usize = 16;

/// A draw future that has settled, tagged with the generation it started as.
struct SettledDraw {
    generation: u64,
    key: RequestKey,
    result: DrawResult,
}

/// Single-flight, cancellable draw dispatcher.
///
/// # Type Parameters
///
/// * `F` - Factory creating a drawer per `draw` request
pub struct TileWorker<F: DrawerFactory> {
    factory: F,
    config: TileWorkerConfig,
    handlers: MessageHandlers,
    diagnostics: Arc<dyn Diagnostics>,
    metrics: Arc<WorkerMetrics>,

    /// The single draw this worker answers for.
    slot: ActiveSlot,

    /// Every started draw that has not settled yet, superseded ones included.
    pending: FuturesUnordered<BoxFuture<'static, SettledDraw>>,
}

impl<F: DrawerFactory> TileWorker<F> {
    /// Create a worker with no extension handlers and tracing diagnostics.
    pub fn new(factory: F, config: TileWorkerConfig) -> Self {
        Self {
            factory,
            config,
            handlers: MessageHandlers::new(),
            diagnostics: Arc::new(TracingDiagnostics),
            metrics: Arc::new(WorkerMetrics::new()),
            slot: ActiveSlot::new(),
            pending: FuturesUnordered::new(),
        }
    }

    /// Set the extension handler table.
    pub fn with_handlers(mut self, handlers: MessageHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Shared handle to the worker's counters.
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The configuration this worker was built with.
    pub fn config(&self) -> &TileWorkerConfig {
        &self.config
    }

    /// Returns true while a draw is held in the active slot.
    pub fn is_busy(&self) -> bool {
        self.slot.is_occupied()
    }

    /// Key of the draw held in the active slot.
    pub fn current_key(&self) -> Option<&RequestKey> {
        self.slot.key()
    }

    /// Number of draws still running, including superseded ones.
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Spawn the worker loop on the current tokio runtime.
    ///
    /// The worker becomes the sole consumer of the port's inbound channel.
    pub fn install<S: MessageSink>(
        self,
        port: WorkerPort<S>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(port, shutdown))
    }

    /// Run the worker loop until shutdown or until the inbound channel closes.
    ///
    /// Inbound messages take precedence over settled draws, so a message that
    /// is already queued is handled before the continuation of a pending draw.
    pub async fn run<S: MessageSink>(mut self, port: WorkerPort<S>, shutdown: CancellationToken) {
        info!(on_busy = %self.config.on_busy, "Tile worker starting");
        let (mut inbound, outbound) = port.into_parts();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Tile worker shutting down");
                    break;
                }

                message = inbound.recv() => match message {
                    Some(message) => self.handle(message, &outbound),
                    None => {
                        info!("Inbound channel closed");
                        break;
                    }
                },

                Some(settled) = self.pending.next(), if !self.pending.is_empty() => {
                    self.complete(settled, &outbound);
                }
            }
        }

        if let Some(key) = self.slot.abort_current() {
            debug!(url = %key, "Aborting in-flight draw on shutdown");
        }
        info!("Tile worker stopped");
    }

    /// Handle one inbound message.
    ///
    /// Never fails: decode errors, protocol misuse and handler failures are
    /// reported to the diagnostics sink.
    pub fn handle<S: MessageSink>(&mut self, message: InboundMessage, sink: &S) {
        match Command::try_from(message) {
            Ok(Command::Draw(request)) => self.start_draw(request),
            Ok(Command::Abort) => self.abort_draw(sink),
            Ok(Command::Extension { kind, payload }) => self.dispatch_extension(kind, payload),
            Err(error) => {
                self.metrics.invalid_message();
                self.diagnostics.warn(&error);
            }
        }
    }

    /// Wait for the next pending draw to settle and process it.
    ///
    /// Returns false when no draws are pending. Useful for hosts that drive
    /// the worker by hand instead of through [`run`](Self::run).
    pub async fn settle_next<S: MessageSink>(&mut self, sink: &S) -> bool {
        match self.pending.next().await {
            Some(settled) => {
                self.complete(settled, sink);
                true
            }
            None => false,
        }
    }

    fn start_draw(&mut self, request: DrawRequest) {
        let (key, data) = request.into_parts();

        if let Some(active) = self.slot.key().cloned() {
            match self.config.on_busy {
                BusyPolicy::Reject => {
                    self.metrics.draw_rejected();
                    self.diagnostics.warn(&WorkerError::Busy {
                        active,
                        rejected: key,
                    });
                    return;
                }
                BusyPolicy::Supersede => {
                    self.slot.abort_current();
                    self.metrics.draw_superseded();
                    debug!(url = %active, superseded_by = %key, "Superseding in-flight draw");
                }
            }
        }

        self.metrics.draw_started();
        let created = panic::catch_unwind(AssertUnwindSafe(|| self.factory.create(&key, data)));
        let drawer = match created {
            Ok(Ok(drawer)) => drawer,
            Ok(Err(error)) => {
                self.report_failure(key, error);
                return;
            }
            Err(panic) => {
                self.report_failure(key, DrawError::panicked("factory", panic));
                return;
            }
        };

        let work = match panic::catch_unwind(AssertUnwindSafe(|| drawer.draw())) {
            Ok(work) => work,
            Err(panic) => {
                self.report_failure(key, DrawError::panicked("drawer", panic));
                return;
            }
        };
        let generation = self.slot.occupy(key.clone(), drawer);
        debug!(url = %key, generation, "Draw started");

        // A panic while polling settles the draw as a failure.
        self.pending.push(Box::pin(async move {
            let result = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(DrawError::panicked("drawer", panic)));
            SettledDraw {
                generation,
                key,
                result,
            }
        }));

        let pending = self.pending.len();
        self.metrics.pending_draws(pending);
        if pending == PENDING_DRAWS_WARN_THRESHOLD {
            warn!(pending, "Superseded draws are not settling after abort");
        }
    }

    fn abort_draw<S: MessageSink>(&mut self, sink: &S) {
        match self.slot.abort_current() {
            Some(key) => {
                self.metrics.draw_aborted();
                debug!(url = %key, "Draw aborted");
            }
            None => debug!("Abort requested with no draw in flight"),
        }

        if self.config.acknowledge_abort {
            sink.post(OutboundMessage::DrawAborted);
        }
    }

    fn dispatch_extension(&mut self, kind: String, payload: Value) {
        match self.handlers.dispatch(&kind, payload) {
            Some(Ok(())) => {
                self.metrics.extension_message();
                debug!(kind = %kind, "Extension message handled");
            }
            Some(Err(error)) => {
                self.metrics.extension_message();
                self.diagnostics.error(&WorkerError::Handler {
                    kind,
                    message: error.to_string(),
                });
            }
            None => {
                self.metrics.unknown_message();
                self.diagnostics.warn(&WorkerError::UnknownMessage { kind });
            }
        }
    }

    fn complete<S: MessageSink>(&mut self, settled: SettledDraw, sink: &S) {
        let SettledDraw {
            generation,
            key,
            result,
        } = settled;

        // The slot is released on every outcome for the current draw.
        if self.slot.settle(generation).is_none() {
            self.metrics.stale_discarded();
            match result {
                Err(error) if !error.is_cancellation() => {
                    debug!(url = %key, generation, error = %error, "Superseded draw failed");
                }
                _ => debug!(url = %key, generation, "Discarding stale draw completion"),
            }
            return;
        }

        match result {
            Ok(data) => {
                match &data {
                    Some(bytes) => {
                        self.metrics.draw_completed();
                        debug!(url = %key, bytes = bytes.len(), "Draw completed");
                    }
                    None => {
                        self.metrics.draw_empty();
                        debug!(url = %key, "Draw completed with no content");
                    }
                }
                sink.post(OutboundMessage::DrawResult { data, url: key });
            }
            Err(error) => self.report_failure(key, error),
        }
    }

    fn report_failure(&self, key: RequestKey, error: DrawError) {
        if error.is_cancellation() {
            self.metrics.draw_cancelled();
            debug!(url = %key, "Draw request was aborted");
            return;
        }

        self.metrics.draw_failed();
        self.diagnostics.error(&WorkerError::Draw { key, source: error });
    }
}
