//! Drawer abstraction.
//!
//! A [`TileDrawer`] is one cancellable unit of work that turns a request into
//! bytes. The worker never looks inside it; it only starts the draw, awaits the
//! returned future and calls [`TileDrawer::abort`] when the draw is superseded
//! or aborted.
//!
//! Drawers are produced per request by a [`DrawerFactory`]. Any closure with
//! the right signature is a factory:
//!
//! ```
//! use bytes::Bytes;
//! use futures::future::BoxFuture;
//! use serde_json::Value;
//! use tileworker::{DrawError, DrawResult, RequestKey, TileDrawer};
//!
//! struct SolidTile;
//!
//! impl TileDrawer for SolidTile {
//!     fn draw(&self) -> BoxFuture<'static, DrawResult> {
//!         Box::pin(async { Ok(Some(Bytes::from_static(&[0xff; 4]))) })
//!     }
//! }
//!
//! let factory = |_key: &RequestKey, _data: Option<Value>| -> Result<Box<dyn TileDrawer>, DrawError> {
//!     Ok(Box::new(SolidTile))
//! };
//! # let _ = factory;
//! ```

mod cancellable;

pub use cancellable::CancellableDrawer;

use crate::error::{DrawError, DrawResult};
use crate::request::RequestKey;
use futures::future::BoxFuture;
use serde_json::Value;

/// One in-progress unit of drawing work.
///
/// The future returned by [`draw`](TileDrawer::draw) must be `'static`: it is
/// polled by the worker independently of the drawer, and keeps running to
/// settlement even after the drawer has been superseded and dropped.
pub trait TileDrawer: Send + 'static {
    /// Start the draw.
    ///
    /// Resolves to the encoded bytes, `None` when there is legitimately
    /// nothing to draw, or an error. Cancellation must surface as
    /// [`DrawError::Aborted`] so the worker can tell it apart from failures.
    fn draw(&self) -> BoxFuture<'static, DrawResult>;

    /// Request cooperative cancellation.
    ///
    /// Advisory only. The worker does not rely on the draw stopping promptly.
    fn abort(&self) {}
}

/// Produces a drawer for each incoming request.
///
/// Factories must not touch worker state; they are called synchronously while
/// a `draw` message is being handled.
pub trait DrawerFactory: Send + 'static {
    /// Create a drawer for the given key and request data.
    fn create(
        &self,
        key: &RequestKey,
        data: Option<Value>,
    ) -> Result<Box<dyn TileDrawer>, DrawError>;
}

impl<F> DrawerFactory for F
where
    F: Fn(&RequestKey, Option<Value>) -> Result<Box<dyn TileDrawer>, DrawError> + Send + 'static,
{
    fn create(
        &self,
        key: &RequestKey,
        data: Option<Value>,
    ) -> Result<Box<dyn TileDrawer>, DrawError> {
        self(key, data)
    }
}
