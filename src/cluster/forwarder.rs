//! # Forwarder: local events to peers.
//!
//! [`Forwarder`] is a [`Handler`] that sends every event whose
//! [`should_forward`](RasEvent::should_forward) is true to a [`ClusterEventSink`].
//! Events received from a peer arrive marked forwarded, so they are never sent
//! back out; this is what breaks forwarding loops.
//!
//! Each request gets the next value of a per-forwarder sequence counter
//! (starting at 1); a response echoing a different sequence is logged.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::events::{ClusterEventReq, ClusterEventResp, RasEvent};
use crate::handlers::Handler;

/// Transport that delivers forwarded events to the cluster.
///
/// Implemented by the embedding service (RPC client, test double, ...).
#[async_trait]
pub trait ClusterEventSink: Send + Sync + 'static {
    async fn send(&self, req: ClusterEventReq) -> anyhow::Result<ClusterEventResp>;
}

/// Handler forwarding eligible events to a [`ClusterEventSink`].
pub struct Forwarder<S> {
    sink: S,
    sequence: AtomicU64,
}

impl<S: ClusterEventSink> Forwarder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            sequence: AtomicU64::new(0),
        }
    }

    /// Access to the underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[async_trait]
impl<S: ClusterEventSink> Handler for Forwarder<S> {
    async fn on_event(&self, ctx: &CancellationToken, event: &RasEvent) {
        if !event.should_forward() {
            tracing::trace!(id = %event.id, forwarded = event.is_forwarded(), "event not forwarded");
            return;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let req = ClusterEventReq {
            sequence,
            event: Some(event.to_wire()),
            forwarded: true,
        };

        let res = tokio::select! {
            _ = ctx.cancelled() => {
                tracing::debug!(sequence, id = %event.id, "forward cancelled");
                return;
            }
            res = self.sink.send(req) => res,
        };

        match res {
            Ok(resp) if resp.sequence != sequence => {
                tracing::warn!(sequence, got = resp.sequence, "forward response sequence mismatch");
            }
            Ok(resp) => {
                tracing::debug!(sequence, id = %event.id, status = resp.status, "event forwarded");
            }
            Err(err) => {
                tracing::error!(sequence, id = %event.id, error = %err, "failed to forward event");
            }
        }
    }

    fn name(&self) -> &'static str {
        "Forwarder"
    }
}
