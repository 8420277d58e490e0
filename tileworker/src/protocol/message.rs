//! Protocol message types.
//!
//! Both directions use `{type, payload}` envelopes. Inbound messages are kept
//! loosely typed until the worker routes them, so that unknown kinds can reach
//! extension handlers untouched.

use crate::error::WorkerError;
use crate::request::{DrawRequest, RequestKey};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound: start a draw.
pub const KIND_DRAW: &str = "draw";

/// Inbound: abort the active draw.
pub const KIND_DRAW_ABORT: &str = "draw:abort";

/// Outbound: result of a draw.
pub const KIND_DRAW_RESULT: &str = "draw:result";

/// Outbound: acknowledgement of an abort.
pub const KIND_DRAW_ABORTED: &str = "draw:aborted";

/// A message delivered to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Message kind discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific payload. `Null` when absent.
    #[serde(default)]
    pub payload: Value,
}

impl InboundMessage {
    /// Create a message of any kind.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// A `draw` message for the given key.
    pub fn draw(key: impl Into<RequestKey>) -> Self {
        Self::draw_request(DrawRequest::new(key))
    }

    /// A `draw` message carrying a full request.
    pub fn draw_request(request: DrawRequest) -> Self {
        // A DrawRequest is a plain string plus JSON value; it always serializes.
        let payload = serde_json::to_value(request).unwrap_or(Value::Null);
        Self::new(KIND_DRAW, payload)
    }

    /// A `draw:abort` message.
    pub fn abort() -> Self {
        Self::new(KIND_DRAW_ABORT, Value::Null)
    }

    /// Parse a message from its JSON text form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// An inbound message after routing.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Begin (or supersede) a draw.
    Draw(DrawRequest),
    /// Abort the active draw, if any.
    Abort,
    /// Any other kind, for the extension handler table.
    Extension { kind: String, payload: Value },
}

impl TryFrom<InboundMessage> for Command {
    type Error = WorkerError;

    fn try_from(message: InboundMessage) -> Result<Self, Self::Error> {
        let InboundMessage { kind, payload } = message;
        match kind.as_str() {
            KIND_DRAW => DrawRequest::from_payload(payload)
                .map(Command::Draw)
                .map_err(|source| WorkerError::InvalidPayload { kind, source }),
            KIND_DRAW_ABORT => Ok(Command::Abort),
            _ => Ok(Command::Extension { kind, payload }),
        }
    }
}

/// A message emitted by the worker.
///
/// The bytes of a draw result are moved into the message; the worker keeps no
/// handle to them once posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    /// A draw settled for the current request.
    #[serde(rename = "draw:result")]
    DrawResult {
        /// Drawn bytes, or `None` when there was nothing to draw.
        data: Option<Bytes>,
        /// Key of the request this result belongs to.
        url: RequestKey,
    },

    /// An abort was processed.
    #[serde(rename = "draw:aborted")]
    DrawAborted,
}

impl OutboundMessage {
    /// The wire kind of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DrawResult { .. } => KIND_DRAW_RESULT,
            Self::DrawAborted => KIND_DRAW_ABORTED,
        }
    }

    /// The request key, for draw results.
    pub fn key(&self) -> Option<&RequestKey> {
        match self {
            Self::DrawResult { url, .. } => Some(url),
            Self::DrawAborted => None,
        }
    }

    /// Take the transferred buffer out of the message.
    pub fn into_data(self) -> Option<Bytes> {
        match self {
            Self::DrawResult { data, .. } => data,
            Self::DrawAborted => None,
        }
    }
}
