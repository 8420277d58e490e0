//! Drawer adapter driven by a [`CancellationToken`].
//!
//! Wraps a closure that receives a token and returns the draw future. Calling
//! [`abort`](TileDrawer::abort) cancels the token; if that happens before the
//! future resolves, the draw settles with [`DrawError::Aborted`] and the inner
//! future is dropped.
//!
//! # Example
//!
//! ```ignore
//! use tileworker::CancellableDrawer;
//!
//! let drawer = CancellableDrawer::new(|token| async move {
//!     let bytes = render_tile(token).await?;
//!     Ok(Some(bytes))
//! });
//!
//! let pending = drawer.draw();
//! drawer.abort(); // pending now resolves to Err(DrawError::Aborted)
//! ```

use super::TileDrawer;
use crate::error::{DrawError, DrawResult};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A drawer whose abort path is a cancellation token.
pub struct CancellableDrawer<F> {
    token: CancellationToken,
    run: F,
}

impl<F, Fut> CancellableDrawer<F>
where
    F: Fn(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = DrawResult> + Send + 'static,
{
    /// Create a drawer with a fresh token.
    pub fn new(run: F) -> Self {
        Self::with_token(CancellationToken::new(), run)
    }

    /// Create a drawer tied to an existing token.
    ///
    /// Useful for making the draw a child of a wider shutdown token.
    pub fn with_token(token: CancellationToken, run: F) -> Self {
        Self { token, run }
    }

    /// The token cancelled by [`abort`](TileDrawer::abort).
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns true once the drawer has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<F, Fut> TileDrawer for CancellableDrawer<F>
where
    F: Fn(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = DrawResult> + Send + 'static,
{
    fn draw(&self) -> BoxFuture<'static, DrawResult> {
        let token = self.token.clone();
        let work = (self.run)(token.clone());
        Box::pin(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(DrawError::Aborted),
                result = work => result,
            }
        })
    }

    fn abort(&self) {
        self.token.cancel();
    }
}
