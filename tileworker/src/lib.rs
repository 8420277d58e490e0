//! TileWorker - single-flight draw dispatcher for tile rendering workers
//!
//! A [`TileWorker`] runs inside an isolated worker task and answers `draw`
//! requests from its host. It holds at most one draw at a time: a newer draw
//! supersedes the running one (or is rejected, depending on [`BusyPolicy`]),
//! `draw:abort` cancels it, and a result is only delivered if its draw is
//! still the current one when it settles.
//!
//! # Modules
//!
//! - [`worker`] - the dispatcher, its configuration and active slot
//! - [`protocol`] - inbound/outbound message types and the host channel
//! - [`drawer`] - the drawer and factory traits the host implements
//! - [`handlers`] - extension message handlers
//! - [`diagnostics`] - where absorbed failures are reported
//! - [`telemetry`] - atomic counters for worker activity
//! - [`logging`] - optional `tracing` subscriber setup
//!
//! # Example
//!
//! ```ignore
//! use tileworker::{worker_channel, InboundMessage, TileWorker, TileWorkerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let (mut host, port) = worker_channel(64);
//! let shutdown = CancellationToken::new();
//! TileWorker::new(factory, TileWorkerConfig::default()).install(port, shutdown.clone());
//!
//! host.send(InboundMessage::draw("https://tiles.example/3/4/2.png")).await?;
//! if let Some(message) = host.recv().await {
//!     let png = message.into_data();
//! }
//! ```

pub mod diagnostics;
pub mod drawer;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod request;
pub mod telemetry;
pub mod worker;

pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use drawer::{CancellableDrawer, DrawerFactory, TileDrawer};
pub use error::{ConfigError, DrawError, DrawResult, WorkerError};
pub use handlers::{HandlerError, MessageHandlers};
pub use protocol::{
    worker_channel, HostPort, InboundMessage, MessageSink, OutboundMessage, WorkerPort,
};
pub use request::{DrawRequest, RequestKey};
pub use telemetry::{WorkerMetrics, WorkerSnapshot};
pub use worker::{BusyPolicy, TileWorker, TileWorkerConfig};
