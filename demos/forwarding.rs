//! # Example: forwarding
//!
//! Two in-process "nodes" wired together through the cluster forwarding path.
//!
//! Shows how to:
//! - Attach the built-in [`LogWriter`] and a [`Forwarder`] to a [`PubSub`].
//! - Implement [`ClusterEventSink`] (here: straight into the peer's service).
//! - Debounce repeated rank-down reports per incarnation.
//! - Keep local-only events (`engine_format_required`) on their node.
//!
//! ## Flow
//! ```text
//! node-a.publish(E) ──► node-a loop ──► LogWriter (node-a)
//!                                  └──► Forwarder ──► InProcessSink
//!                                                        └─► node-b ClusterEventService.handle()
//!                                                               └─► node-b loop ──► LogWriter (node-b)
//!                                                                              └──► Forwarder (skips: forwarded)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example forwarding --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use raspubsub::{
    ClusterEventReq, ClusterEventResp, ClusterEventService, ClusterEventSink, Forwarder, LogWriter,
    PubSub, PubSubConfig, RasId, RasSeverity, RasType, constructors, rank_incarnation_key,
};
use tracing_subscriber::EnvFilter;

/// Delivers requests to a peer's service without any transport in between.
struct InProcessSink {
    peer: ClusterEventService,
}

#[async_trait::async_trait]
impl ClusterEventSink for InProcessSink {
    async fn send(&self, req: ClusterEventReq) -> anyhow::Result<ClusterEventResp> {
        Ok(self.peer.handle(Some(req)).await?)
    }
}

async fn node(cfg: &PubSubConfig, peer: &PubSub) -> PubSub {
    let bus = PubSub::new(cfg.clone());
    let sink = InProcessSink {
        peer: ClusterEventService::new(Arc::new(peer.clone())),
    };
    bus.subscribe(RasType::Any, Arc::new(LogWriter::new())).await;
    bus.subscribe(RasType::StateChange, Arc::new(Forwarder::new(sink))).await;
    bus
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = PubSubConfig::default();

    // node-b only receives and logs.
    let node_b = PubSub::new(cfg.clone());
    node_b.subscribe(RasType::Any, Arc::new(LogWriter::new())).await;

    let node_a = node(&cfg, &node_b).await;
    node_a
        .debounce(RasId::SwimRankDead, Duration::ZERO, rank_incarnation_key)
        .await;

    // Reported twice by different observers: delivered (and forwarded) once.
    node_a
        .publish(constructors::rank_down("node-a", 1, 1, 0x2a, "missed heartbeats"))
        .await;
    node_a
        .publish(constructors::rank_down("node-a", 1, 1, 0x2a, "missed heartbeats"))
        .await;
    // New incarnation of the same rank: a new key.
    node_a
        .publish(constructors::rank_down("node-a", 1, 1, 0x2b, "missed heartbeats"))
        .await;

    node_a
        .publish(constructors::engine_died("node-a", 0, 2, 7, "signal: killed", 4242))
        .await;
    node_a
        .publish(constructors::engine_format_required("node-a", 1, "SCM"))
        .await;
    node_a
        .publish(constructors::generic(
            RasId::SystemStopFailed,
            RasSeverity::Warning,
            "controlled shutdown of rank 3 failed",
            "rank=3",
        ))
        .await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    node_a.close();
    node_b.close();
    Ok(())
}
