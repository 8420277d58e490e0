//! Draw request types.
//!
//! A [`DrawRequest`] is the decoded payload of a `draw` message: the key of
//! the resource to render plus whatever extra data the host attached. It only
//! lives long enough to be handed to the drawer factory.
//!
//! # Example
//!
//! ```
//! use tileworker::DrawRequest;
//!
//! let request = DrawRequest::from_payload(serde_json::json!({
//!     "url": "tiles/12/2048/1361.pbf",
//!     "data": {"style": "dark"},
//! }))
//! .unwrap();
//!
//! assert_eq!(request.key().as_str(), "tiles/12/2048/1361.pbf");
//! assert!(request.data().is_some());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque identifier of the resource a draw produces, usually a tile URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    /// Create a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RequestKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A request to draw one resource.
///
/// On the wire the key travels as `url`; `data` is optional and opaque to the
/// worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRequest {
    #[serde(rename = "url")]
    key: RequestKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl DrawRequest {
    /// Create a request without extra data.
    pub fn new(key: impl Into<RequestKey>) -> Self {
        Self {
            key: key.into(),
            data: None,
        }
    }

    /// Attach request-scoped data for the drawer.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Decode a request from a `draw` message payload.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }

    /// The resource key.
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Extra data supplied by the host, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Split the request into key and data.
    pub fn into_parts(self) -> (RequestKey, Option<Value>) {
        (self.key, self.data)
    }
}
