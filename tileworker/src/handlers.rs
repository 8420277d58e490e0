//! Extension message handlers.
//!
//! Message kinds other than `draw` and `draw:abort` are looked up in a
//! [`MessageHandlers`] table built once when the worker is constructed. The
//! built-in kinds always win; registering a handler under one of them has no
//! effect.
//!
//! # Example
//!
//! ```
//! use tileworker::MessageHandlers;
//!
//! let handlers = MessageHandlers::new()
//!     .with_handler("style:set", |payload| {
//!         let _name = payload["name"].as_str().ok_or("missing style name")?;
//!         Ok(())
//!     });
//!
//! assert!(handlers.contains("style:set"));
//! ```

use crate::error::panic_message;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Error type returned by extension handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Box<dyn Fn(Value) -> Result<(), HandlerError> + Send + Sync>;

/// Immutable mapping from message kind to handler.
#[derive(Default)]
pub struct MessageHandlers {
    handlers: HashMap<String, Handler>,
}

impl MessageHandlers {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`, replacing any earlier one.
    pub fn with_handler<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Returns true if a handler is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke the handler for `kind`.
    ///
    /// Returns `None` when no handler is registered. A panicking handler is
    /// caught and turned into an error.
    pub(crate) fn dispatch(&self, kind: &str, payload: Value) -> Option<Result<(), HandlerError>> {
        let handler = self.handlers.get(kind)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(payload)));
        Some(outcome.unwrap_or_else(|panic| Err(panic_message("handler", panic).into())))
    }
}

impl fmt::Debug for MessageHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("MessageHandlers")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatch_calls_handler_with_payload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handlers = MessageHandlers::new().with_handler("zoom", move |payload| {
            assert_eq!(payload, json!(14));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(matches!(handlers.dispatch("zoom", json!(14)), Some(Ok(()))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_unknown_kind() {
        let handlers = MessageHandlers::new();
        assert!(handlers.dispatch("ping", Value::Null).is_none());
        assert!(handlers.is_empty());
    }

    #[test]
    fn test_dispatch_returns_handler_error() {
        let handlers =
            MessageHandlers::new().with_handler("bad", |_| Err("cannot apply".into()));
        let err = handlers.dispatch("bad", Value::Null).unwrap().unwrap_err();
        assert_eq!(err.to_string(), "cannot apply");
    }

    #[test]
    fn test_dispatch_catches_panic() {
        let handlers = MessageHandlers::new().with_handler("boom", |_| panic!("exploded"));
        let err = handlers.dispatch("boom", Value::Null).unwrap().unwrap_err();
        assert_eq!(err.to_string(), "handler panicked: exploded");
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let handlers = MessageHandlers::new()
            .with_handler("x", |_| Err("first".into()))
            .with_handler("x", |_| Ok(()));
        assert_eq!(handlers.len(), 1);
        assert!(matches!(handlers.dispatch("x", Value::Null), Some(Ok(()))));
    }

    #[test]
    fn test_debug_lists_kinds() {
        let handlers = MessageHandlers::new()
            .with_handler("b", |_| Ok(()))
            .with_handler("a", |_| Ok(()));
        assert_eq!(format!("{:?}", handlers), r#"MessageHandlers { kinds: ["a", "b"] }"#);
    }
}
