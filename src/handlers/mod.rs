//! # RAS event handlers.
//!
//! This module provides the [`Handler`] trait and the built-in handlers.
//!
//! ## Architecture
//! ```text
//! PubSub loop ── dispatch(Arc<RasEvent>) ──► for each matching subscription
//!                                               │
//!                                               ├──► tokio::spawn(handler A.on_event)
//!                                               ├──► tokio::spawn(handler B.on_event)
//!                                               └──► tokio::spawn(handler N.on_event)
//! ```
//!
//! ## Handler types
//! - **Passive handlers** observe events (logging, alerting): [`LogWriter`]
//! - **Relaying handlers** push events elsewhere: [`Forwarder`](crate::Forwarder)
//! - **Closures** via [`HandlerFn`]

mod handler;
mod handler_fn;
#[cfg(feature = "logging")]
mod log;

pub use handler::Handler;
pub use handler_fn::HandlerFn;
#[cfg(feature = "logging")]
pub use log::LogWriter;
