//! # Core handler trait
//!
//! `Handler` is the extension point for consuming RAS events. The coordinator
//! spawns one task per (event, matching handler) and never awaits it.
//!
//! ## Contract
//! - `on_event` may run **concurrently with itself** (two events, or the same
//!   event delivered through two subscriptions); guard shared state accordingly.
//! - Must not block indefinitely; the bus cannot observe a hung handler.
//! - `ctx` is cancelled when the bus is closed. Long-running work should watch it.
//! - A panic is caught and logged; it does not affect other handlers.
//!
//! ## Example (skeleton)
//! ```rust
//! use raspubsub::{Handler, RasEvent};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Audit;
//!
//! #[async_trait::async_trait]
//! impl Handler for Audit {
//!     async fn on_event(&self, _ctx: &CancellationToken, ev: &RasEvent) {
//!         let _ = ev.to_string(); // write audit record...
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::events::RasEvent;

/// Contract for RAS event consumers.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handle one deliverable event.
    async fn on_event(&self, ctx: &CancellationToken, event: &RasEvent);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
