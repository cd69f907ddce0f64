//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a synchronous closure `F: Fn(&CancellationToken, &RasEvent)`.
//! The closure runs inside the handler task the bus spawns, so it must be quick;
//! anything slow belongs in a full [`Handler`] implementation.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use raspubsub::{Handler, HandlerFn};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! let h: Arc<dyn Handler> = HandlerFn::arc("counter", move |_ctx, _ev| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! assert_eq!(h.name(), "counter");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::events::RasEvent;
use crate::handlers::Handler;

/// Function-backed handler implementation.
pub struct HandlerFn<F> {
    name: &'static str,
    f: F,
}

impl<F> HandlerFn<F>
where
    F: Fn(&CancellationToken, &RasEvent) + Send + Sync + 'static,
{
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need an `Arc<dyn Handler>`.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&CancellationToken, &RasEvent) + Send + Sync + 'static,
{
    async fn on_event(&self, ctx: &CancellationToken, event: &RasEvent) {
        (self.f)(ctx, event)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
