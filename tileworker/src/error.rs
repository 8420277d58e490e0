//! Error types for the tile worker.
//!
//! - [`DrawError`] is what a drawer's future fails with. [`DrawError::Aborted`]
//!   is the recognized cancellation outcome and is never reported.
//! - [`WorkerError`] covers everything the worker reports to its
//!   [`Diagnostics`](crate::Diagnostics) sink: protocol misuse, payload decode
//!   failures, extension handler failures and draw failures.
//! - [`ConfigError`] is returned when loading a [`TileWorkerConfig`](crate::TileWorkerConfig).

use crate::request::RequestKey;
use std::any::Any;
use thiserror::Error;

/// Errors produced by a drawer.
#[derive(Debug, Error)]
pub enum DrawError {
    /// The draw was cancelled through its abort path.
    #[error("Draw was aborted")]
    Aborted,

    /// The draw failed with a message.
    #[error("Draw failed: {0}")]
    Failed(String),

    /// The draw failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl DrawError {
    /// Wrap an arbitrary error.
    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }

    /// Turn a caught panic from `origin` into a failure.
    pub(crate) fn panicked(origin: &str, panic: Box<dyn Any + Send>) -> Self {
        Self::Failed(panic_message(origin, panic))
    }

    /// Returns true for the cancellation outcome, which is swallowed silently.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Describe a caught panic payload as "`origin` panicked: message".
pub(crate) fn panic_message(origin: &str, panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("{} panicked: {}", origin, message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("{} panicked: {}", origin, message)
    } else {
        format!("{} panicked", origin)
    }
}

/// Outcome of a draw: bytes, explicitly no content, or an error.
pub type DrawResult = Result<Option<bytes::Bytes>, DrawError>;

/// Failures reported by the worker at its message-handling boundary.
///
/// None of these stop the worker; they are handed to the diagnostics sink and
/// the next message is processed normally.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A draw arrived while another was in flight under the reject policy.
    #[error("Tile drawing is already in progress for {active}, rejected {rejected}")]
    Busy {
        active: RequestKey,
        rejected: RequestKey,
    },

    /// No handler is registered for the message kind.
    #[error("Unknown message type: {kind}")]
    UnknownMessage { kind: String },

    /// The payload of a recognized message could not be decoded.
    #[error("Invalid payload for '{kind}' message: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// An extension handler returned an error or panicked.
    #[error("Handler for '{kind}' failed: {message}")]
    Handler { kind: String, message: String },

    /// A draw failed for a reason other than cancellation.
    #[error("Error while drawing {key}: {source}")]
    Draw {
        key: RequestKey,
        #[source]
        source: DrawError,
    },
}

/// Errors that can occur while loading worker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_is_cancellation() {
        assert!(DrawError::Aborted.is_cancellation());
        assert!(!DrawError::Failed("boom".into()).is_cancellation());
        assert!(!DrawError::other(std::io::Error::other("io")).is_cancellation());
    }

    #[test]
    fn test_panicked_keeps_payload_message() {
        let err = DrawError::panicked("drawer", Box::new("decoder bug"));
        assert_eq!(err.to_string(), "Draw failed: drawer panicked: decoder bug");

        let err = DrawError::panicked("factory", Box::new(String::from("bad scheme")));
        assert_eq!(err.to_string(), "Draw failed: factory panicked: bad scheme");

        assert_eq!(panic_message("drawer", Box::new(7_u32)), "drawer panicked");
    }

    #[test]
    fn test_worker_error_display() {
        let err = WorkerError::Busy {
            active: RequestKey::from("a"),
            rejected: RequestKey::from("b"),
        };
        assert_eq!(
            err.to_string(),
            "Tile drawing is already in progress for a, rejected b"
        );

        let err = WorkerError::Draw {
            key: RequestKey::from("a"),
            source: DrawError::Failed("decode".into()),
        };
        assert_eq!(err.to_string(), "Error while drawing a: Draw failed: decode");
    }

    #[test]
    fn test_draw_error_source_chain() {
        use std::error::Error;

        let err = WorkerError::Draw {
            key: RequestKey::from("a"),
            source: DrawError::Aborted,
        };
        assert!(err.source().is_some());
    }
}
