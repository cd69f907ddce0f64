//! # raspubsub
//!
//! **raspubsub** is the in-process RAS (reliability, availability,
//! serviceability) event core of a storage control plane.
//!
//! Producers publish [`RasEvent`]s; a single coordinator loop filters them by
//! id, suppresses repeats according to per-id debounce policies, and fans each
//! surviving event out to the handlers subscribed to its type. Events can be
//! relayed to and received from peer nodes through a wire envelope without
//! looping back.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producers             peers (transport)
//!      │                        │ ClusterEventReq
//!      │                        ▼
//!      │              ┌──────────────────────┐
//!      │              │ ClusterEventService  │ decode, mark forwarded
//!      │              └──────────┬───────────┘
//!      ▼                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PubSub (handle)  ── bounded mpsc<Command>, send_timeout ──►      │
//! │  coordinator loop (one task, owns all state)                      │
//! │   - EventFilter   (disabled ids)                                  │
//! │   - Debouncer     (per-id policies + last-attempt history)        │
//! │   - DispatchTable (topic → handlers)                              │
//! │   - cleanup tick  (prunes debounce history)                       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼ spawn            ▼ spawn            ▼ spawn
//!   ┌──────────┐      ┌──────────┐      ┌──────────────┐
//!   │ Handler  │      │LogWriter │      │  Forwarder   │ should_forward()?
//!   └──────────┘      └──────────┘      └──────┬───────┘
//!                                              ▼
//!                                       ClusterEventSink ──► peers
//! ```
//!
//! ### Publish path
//! ```text
//! publish(E) ──► queue ──► loop
//!                           ├─ id disabled?         ─► drop
//!                           ├─ debounce suppressed? ─► drop
//!                           └─ for h in Any ++ topic(E.type):
//!                                  tokio::spawn(h.on_event(ctx, E))   (never awaited)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Events**        | Identity, payloads, JSON and wire encodings.                | [`RasEvent`], [`RasId`], [`ExtendedInfo`]   |
//! | **Coordinator**   | Filter, debounce, type-based fan-out.                       | [`PubSub`], [`Publisher`]                   |
//! | **Handlers**      | Consume delivered events.                                   | [`Handler`], [`HandlerFn`]                  |
//! | **Cluster**       | Receive and forward events between nodes.                   | [`ClusterEventService`], [`Forwarder`]      |
//! | **Errors**        | Typed decode and boundary errors.                           | [`RasError`]                                |
//! | **Configuration** | Queue capacity, submit timeout, cleanup interval.           | [`PubSubConfig`]                            |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] handler (events to `tracing`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use raspubsub::{constructors, rank_incarnation_key, HandlerFn, PubSub, PubSubConfig, RasId, RasType};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = PubSub::new(PubSubConfig::default());
//!
//!     bus.subscribe(
//!         RasType::StateChange,
//!         HandlerFn::arc("print", |_ctx, ev| println!("{ev}")),
//!     )
//!     .await;
//!
//!     // Report each rank death once per incarnation.
//!     bus.debounce(RasId::SwimRankDead, Duration::ZERO, rank_incarnation_key).await;
//!
//!     let ev = constructors::rank_down("node-a", 1, 1, 0x10, "missed heartbeats");
//!     bus.publish(ev.clone()).await;
//!     bus.publish(ev).await; // suppressed
//!
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     bus.close();
//! }
//! ```
mod cluster;
mod error;
mod events;
mod handlers;
mod pubsub;

// ---- Public re-exports ----

pub use cluster::{ClusterEventService, ClusterEventSink, Forwarder};
pub use error::RasError;
pub use events::constructors;
pub use events::{
    ClusterEventReq, ClusterEventResp, EngineStateInfo, ExtendedInfo, InfoKind, NIL_RANK,
    PoolSvcInfo, RasEvent, RasId, RasSeverity, RasType, WireEvent, WireExtendedInfo,
};
pub use handlers::{Handler, HandlerFn};
pub use pubsub::{
    KeyFn, MAX_CLEANUP_INTERVAL, PubSub, PubSubConfig, Publisher, rank_incarnation_key,
};

// Optional: expose the built-in tracing handler.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use handlers::LogWriter;
