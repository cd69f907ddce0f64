use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use raspubsub::{
    ClusterEventReq, ClusterEventResp, ClusterEventService, ClusterEventSink, ExtendedInfo,
    Forwarder, Handler, PubSub, PubSubConfig, RasEvent, RasId, RasType, WireEvent, constructors,
};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sink delivering straight into a peer's service, counting requests.
struct Loopback {
    peer: ClusterEventService,
    sent: Mutex<u64>,
}

#[async_trait]
impl ClusterEventSink for Loopback {
    async fn send(&self, req: ClusterEventReq) -> anyhow::Result<ClusterEventResp> {
        *self.sent.lock().unwrap() += 1;
        Ok(self.peer.handle(Some(req)).await?)
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<RasEvent>>);

#[async_trait]
impl Handler for Recorder {
    async fn on_event(&self, _ctx: &CancellationToken, event: &RasEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl Recorder {
    fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() && Instant::now() < deadline {
        sleep(Duration::from_millis(5)).await;
    }
}

#[test]
fn test_wire_round_trip_resets_forwarding() {
    let events = vec![
        constructors::engine_died("node-a", 1, 3, 0xbeef, "signal: killed", 1234),
        constructors::rank_down("node-b", 0, 7, 2, "missed heartbeats"),
        constructors::pool_svc_replicas_update("node-c", 2, "pool-1", vec![0, 2, 4], 9),
        constructors::engine_format_required("node-d", 0, "SCM"),
        RasEvent::new(RasId::UnknownEvent),
    ];

    for ev in events {
        ev.set_forwarded(true);
        let back = RasEvent::from_wire(Some(ev.to_wire())).unwrap();
        assert_eq!(back, ev);
        assert!(!back.is_forwarded());
        assert!(back.is_forwardable());
    }
}

#[test]
fn test_wire_envelope_serializes() {
    let ev = constructors::engine_died("node-a", 1, 3, 1, "exit 1", 99);
    let json = serde_json::to_string(&ev.to_wire()).unwrap();
    let wire: WireEvent = serde_json::from_str(&json).unwrap();
    let back = RasEvent::from_wire(Some(wire)).unwrap();

    assert_eq!(back, ev);
    match back.extended_info {
        Some(ExtendedInfo::EngineState(info)) => {
            assert_eq!(info.instance, 1);
            assert_eq!(info.exit_err.as_deref(), Some("exit 1"));
        }
        other => panic!("unexpected extended info: {other:?}"),
    }
}

#[test]
fn test_json_round_trip() {
    let ev = constructors::pool_svc_replicas_update("node-c", 2, "pool-1", vec![1, 3], 4);
    let back = RasEvent::from_json(&ev.to_json().unwrap()).unwrap();
    assert_eq!(back, ev);
}

#[tokio::test]
async fn test_two_nodes_forward_without_looping() {
    init_tracing();
    let node_a = PubSub::new(PubSubConfig::default());
    let node_b = PubSub::new(PubSubConfig::default());

    let to_b = Arc::new(Forwarder::new(Loopback {
        peer: ClusterEventService::new(Arc::new(node_b.clone())),
        sent: Mutex::new(0),
    }));
    let to_a = Arc::new(Forwarder::new(Loopback {
        peer: ClusterEventService::new(Arc::new(node_a.clone())),
        sent: Mutex::new(0),
    }));
    let seen_a = Arc::new(Recorder::default());
    let seen_b = Arc::new(Recorder::default());

    node_a.subscribe(RasType::Any, to_b.clone()).await;
    node_a.subscribe(RasType::Any, seen_a.clone()).await;
    node_b.subscribe(RasType::Any, to_a.clone()).await;
    node_b.subscribe(RasType::Any, seen_b.clone()).await;

    let ev = constructors::rank_down("node-a", 1, 5, 3, "");
    node_a.publish(ev.clone()).await;
    // Never forwarded: flagged local-only at construction.
    node_a
        .publish(constructors::engine_format_required("node-a", 0, "NVMe"))
        .await;

    wait_until(|| seen_b.len() >= 1 && seen_a.len() >= 2).await;
    sleep(Duration::from_millis(50)).await;

    let a = seen_a.0.lock().unwrap();
    let b = seen_b.0.lock().unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0], ev);
    assert!(b[0].is_forwarded());

    assert_eq!(*to_b.sink().sent.lock().unwrap(), 1);
    assert_eq!(*to_a.sink().sent.lock().unwrap(), 0);
}
