//! The single-flight draw worker.
//!
//! - [`TileWorker`] - routes inbound messages, owns the active draw
//! - [`TileWorkerConfig`] - busy policy, abort acknowledgement, channel size
//! - [`BusyPolicy`] - reject or supersede a draw that arrives while busy

mod config;
mod dispatcher;
mod slot;

pub use config::{BusyPolicy, TileWorkerConfig, CONFIG_SECTION, DEFAULT_CHANNEL_CAPACITY};
pub use dispatcher::{TileWorker, PENDING_DRAWS_WARN_THRESHOLD};
