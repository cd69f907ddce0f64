//! # PubSub: the event coordinator.
//!
//! [`PubSub`] is a cheap, cloneable handle to a single background loop that
//! exclusively owns the filter, the dispatch table and the debounce state. Every
//! operation is a message into that loop, so no locks guard any of it.
//!
//! ## Architecture
//! ```text
//! Producers / config callers (many)          Coordinator loop (one task)
//!   publish ─────┐
//!   subscribe ───┤   bounded mpsc<Command>    ┌──────────────────────────────┐
//!   disable/enable ──┼──────────────────────────►│ select!                      │
//!   debounce ────┤   (send_timeout)           │  ├─ token.cancelled → exit   │
//!   reset ───────┘                            │  ├─ Command → handle          │
//!                                             │  └─ tick → prune debounce    │
//!                                             └──────────────┬───────────────┘
//!                                                            ▼ Publish(E)
//!                                       filter? ─► debounce? ─► matching(E.type)
//!                                                            │
//!                                        ┌───────────────────┼───────────────────┐
//!                                        ▼                   ▼                   ▼
//!                              spawn(h1.on_event)   spawn(h2.on_event)   spawn(hN.on_event)
//! ```
//!
//! ## Rules
//! - **Bounded submit**: callers wait at most `submit_timeout` for queue room;
//!   on timeout or a closed loop the command is logged and dropped.
//! - **One ordered queue**: commands from one caller are applied in call order
//!   (a `subscribe` awaited before a `publish` is always in effect for it).
//! - **Fire-and-forget handlers**: one task per matching handler, never awaited;
//!   all spawns for an event happen before the next command is read.
//! - **Filter before debounce**: disabled ids leave no debounce history.
//! - **Close**: cancels the loop; spawned handler tasks keep running.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::SubmitError;
use crate::events::{RasEvent, RasId, RasType};
use crate::handlers::Handler;

use super::config::PubSubConfig;
use super::debounce::{DebouncePolicy, Debouncer};
use super::dispatch::DispatchTable;
use super::filter::EventFilter;
use super::publisher::Publisher;

enum Command {
    Publish(Arc<RasEvent>),
    Subscribe {
        topic: RasType,
        handler: Arc<dyn Handler>,
    },
    Disable(Vec<RasId>),
    Enable(Vec<RasId>),
    Debounce {
        id: RasId,
        policy: Option<DebouncePolicy>,
    },
    Reset {
        done: oneshot::Sender<()>,
    },
}

impl Command {
    fn as_label(&self) -> &'static str {
        match self {
            Command::Publish(_) => "publish",
            Command::Subscribe { .. } => "subscribe",
            Command::Disable(_) => "disable_ids",
            Command::Enable(_) => "enable_ids",
            Command::Debounce { .. } => "debounce",
            Command::Reset { .. } => "reset",
        }
    }
}

/// Handle to the RAS event coordinator.
///
/// Cloning is cheap; all clones drive the same loop. The loop ends on
/// [`close`](Self::close), when the parent token is cancelled, or when the last
/// handle is dropped.
#[derive(Clone)]
pub struct PubSub {
    tx: mpsc::Sender<Command>,
    token: CancellationToken,
    submit_timeout: Duration,
}

impl PubSub {
    /// Creates the coordinator and spawns its loop on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime (as `tokio::spawn` does).
    pub fn new(cfg: PubSubConfig) -> Self {
        Self::with_token(cfg, CancellationToken::new())
    }

    /// Like [`new`](Self::new), with the loop lifetime bound to a child of `parent`.
    pub fn with_parent(cfg: PubSubConfig, parent: &CancellationToken) -> Self {
        Self::with_token(cfg, parent.child_token())
    }

    fn with_token(cfg: PubSubConfig, token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let coordinator = Coordinator {
            rx,
            token: token.clone(),
            cleanup_interval: cfg.cleanup_interval_clamped(),
            filter: EventFilter::default(),
            table: DispatchTable::default(),
            debouncer: Debouncer::default(),
        };
        tokio::spawn(coordinator.run());

        Self {
            tx,
            token,
            submit_timeout: cfg.submit_timeout_clamped(),
        }
    }

    /// Queues an event for dispatch.
    ///
    /// Waits at most the submit timeout for queue room; on failure the event is
    /// logged and dropped.
    pub async fn publish(&self, event: impl Into<Arc<RasEvent>>) {
        let event = event.into();
        let id = event.id;
        if let Err(err) = self.submit(Command::Publish(event)).await {
            tracing::error!(%id, reason = err.as_label(), "failed to publish RAS event");
        }
    }

    /// Registers `handler` for events of `topic` ([`RasType::Any`] for all events).
    pub async fn subscribe(&self, topic: RasType, handler: Arc<dyn Handler>) {
        let name = handler.name();
        if let Err(err) = self.submit(Command::Subscribe { topic, handler }).await {
            tracing::error!(%topic, handler = name, reason = err.as_label(), "failed to subscribe");
        }
    }

    /// Stops dispatch of the given ids until they are enabled again.
    pub async fn disable_event_ids(&self, ids: impl IntoIterator<Item = RasId>) {
        let ids: Vec<RasId> = ids.into_iter().collect();
        self.submit_logged(Command::Disable(ids)).await;
    }

    /// Resumes dispatch of the given ids.
    pub async fn enable_event_ids(&self, ids: impl IntoIterator<Item = RasId>) {
        let ids: Vec<RasId> = ids.into_iter().collect();
        self.submit_logged(Command::Enable(ids)).await;
    }

    /// Installs (or replaces) the debounce policy for `id`.
    ///
    /// Events of `id` whose `key_fn` result was seen less than `cooldown` ago
    /// (measured from the last attempt) are dropped; with a zero cooldown every
    /// repeat of a key is dropped until its history is pruned.
    pub async fn debounce<F>(&self, id: RasId, cooldown: Duration, key_fn: F)
    where
        F: Fn(&RasEvent) -> String + Send + Sync + 'static,
    {
        let policy = DebouncePolicy {
            cooldown,
            key_fn: Arc::new(key_fn),
        };
        self.submit_logged(Command::Debounce {
            id,
            policy: Some(policy),
        })
        .await;
    }

    /// Removes the debounce policy for `id`.
    pub async fn clear_debounce(&self, id: RasId) {
        self.submit_logged(Command::Debounce { id, policy: None }).await;
    }

    /// Clears all subscriptions and debounce state; the filter is kept.
    ///
    /// Returns once the loop has applied the reset, or after logging if it could
    /// not be queued or acknowledged within the submit timeout.
    pub async fn reset(&self) {
        let (done, ack) = oneshot::channel();
        if !self.submit_logged(Command::Reset { done }).await {
            return;
        }
        match time::timeout(self.submit_timeout, ack).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => tracing::warn!("reset dropped: coordinator closed"),
            Err(_) => tracing::warn!(timeout = ?self.submit_timeout, "reset not acknowledged in time"),
        }
    }

    /// Stops the loop. Handler tasks already spawned are neither awaited nor aborted.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// True once the loop has been told to stop.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    async fn submit(&self, cmd: Command) -> Result<(), SubmitError> {
        if self.token.is_cancelled() {
            return Err(SubmitError::Closed);
        }
        self.tx
            .send_timeout(cmd, self.submit_timeout)
            .await
            .map_err(|e| match e {
                mpsc::error::SendTimeoutError::Timeout(_) => SubmitError::Timeout,
                mpsc::error::SendTimeoutError::Closed(_) => SubmitError::Closed,
            })
    }

    async fn submit_logged(&self, cmd: Command) -> bool {
        let op = cmd.as_label();
        match self.submit(cmd).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(op, reason = err.as_label(), "pubsub command dropped");
                false
            }
        }
    }
}

#[async_trait]
impl Publisher for PubSub {
    async fn publish(&self, event: Arc<RasEvent>) {
        PubSub::publish(self, event).await
    }
}

/// Loop state; lives inside the spawned task only.
struct Coordinator {
    rx: mpsc::Receiver<Command>,
    token: CancellationToken,
    cleanup_interval: Duration,
    filter: EventFilter,
    table: DispatchTable,
    debouncer: Debouncer,
}

impl Coordinator {
    async fn run(mut self) {
        let period = self.cleanup_interval;
        let mut cleanup = time::interval_at(Instant::now() + period, period);
        cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = cleanup.tick() => {
                    let removed = self.debouncer.prune(Instant::now(), self.cleanup_interval);
                    tracing::debug!(removed, remaining = self.debouncer.history_len(), "pruned debounce history");
                }
            }
        }
        tracing::debug!("pubsub coordinator stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Publish(event) => self.dispatch(event),
            Command::Subscribe { topic, handler } => {
                tracing::debug!(%topic, handler = handler.name(), "handler subscribed");
                self.table.subscribe(topic, handler);
            }
            Command::Disable(ids) => {
                self.filter.disable(&ids);
                tracing::debug!(?ids, disabled = self.filter.len(), "event ids disabled");
            }
            Command::Enable(ids) => {
                self.filter.enable(&ids);
                tracing::debug!(?ids, disabled = self.filter.len(), "event ids enabled");
            }
            Command::Debounce { id, policy: Some(policy) } => {
                tracing::debug!(%id, cooldown = ?policy.cooldown, "debounce policy set");
                self.debouncer.set_policy(id, policy);
            }
            Command::Debounce { id, policy: None } => {
                tracing::debug!(%id, "debounce policy removed");
                self.debouncer.remove_policy(id);
            }
            Command::Reset { done } => {
                tracing::debug!(
                    subscriptions = self.table.len(),
                    policies = self.debouncer.policy_count(),
                    "pubsub reset"
                );
                self.table.clear();
                self.debouncer.clear();
                let _ = done.send(());
            }
        }
    }

    fn dispatch(&mut self, event: Arc<RasEvent>) {
        if self.filter.is_disabled(event.id) {
            tracing::trace!(id = %event.id, "event disabled, dropped");
            return;
        }
        if self.debouncer.is_suppressed(&event, Instant::now()) {
            tracing::debug!(id = %event.id, rank = event.rank, "event debounced");
            return;
        }
        for handler in self.table.matching(event.event_type) {
            spawn_handler(Arc::clone(handler), self.token.child_token(), Arc::clone(&event));
        }
    }
}

/// Runs one handler invocation on its own task, isolating panics.
fn spawn_handler(handler: Arc<dyn Handler>, ctx: CancellationToken, event: Arc<RasEvent>) {
    tokio::spawn(async move {
        let fut = handler.on_event(&ctx, &event);
        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::warn!(handler = handler.name(), id = %event.id, %info, "handler panicked");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerFn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Arc<dyn Handler>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let h: Arc<dyn Handler> = HandlerFn::arc("counter", move |_: &CancellationToken, _: &RasEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, h)
    }

    async fn wait_for(count: &AtomicUsize, want: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while count.load(Ordering::SeqCst) < want && Instant::now() < deadline {
            time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_is_isolated() {
        let bus = PubSub::new(PubSubConfig::default());
        let boom = HandlerFn::arc("boom", |_: &CancellationToken, _: &RasEvent| panic!("boom"));
        let (count, h) = counter();

        bus.subscribe(RasType::Any, boom).await;
        bus.subscribe(RasType::Any, h).await;
        for _ in 0..3 {
            bus.publish(RasEvent::new(RasId::EngineDied).with_defaults()).await;
        }

        wait_for(&count, 3).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_closed_bus_drops_commands() {
        let bus = PubSub::new(PubSubConfig::default());
        let (count, h) = counter();
        bus.subscribe(RasType::Any, h).await;

        bus.close();
        assert!(bus.is_closed());
        assert_eq!(
            bus.submit(Command::Enable(vec![])).await,
            Err(SubmitError::Closed)
        );

        bus.publish(RasEvent::new(RasId::EngineDied).with_defaults()).await;
        // Reset on a closed bus returns instead of blocking.
        time::timeout(Duration::from_secs(1), bus.reset())
            .await
            .expect("reset must not block on a closed bus");

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_huge_cleanup_interval_keeps_loop_alive() {
        let cfg = PubSubConfig {
            cleanup_interval: Duration::MAX,
            ..PubSubConfig::default()
        };
        let bus = PubSub::new(cfg);
        let (count, h) = counter();
        bus.subscribe(RasType::Any, h).await;
        bus.publish(RasEvent::new(RasId::EngineDied)).await;

        wait_for(&count, 1).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parent_token_stops_loop() {
        let parent = CancellationToken::new();
        let bus = PubSub::with_parent(PubSubConfig::default(), &parent);
        assert!(!bus.is_closed());
        parent.cancel();
        assert!(bus.is_closed());
    }

    #[tokio::test]
    async fn test_full_queue_times_out() {
        let cfg = PubSubConfig {
            submit_timeout: Duration::from_millis(20),
            queue_capacity: 1,
            ..PubSubConfig::default()
        };
        // Hand-built handle with no loop draining the queue.
        let (tx, _rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let bus = PubSub {
            tx,
            token: CancellationToken::new(),
            submit_timeout: cfg.submit_timeout_clamped(),
        };

        assert_eq!(bus.submit(Command::Enable(vec![])).await, Ok(()));
        let started = Instant::now();
        assert_eq!(
            bus.submit(Command::Enable(vec![])).await,
            Err(SubmitError::Timeout)
        );
        assert!(started.elapsed() >= Duration::from_millis(20));

        // Public entry points log and return instead of hanging.
        time::timeout(Duration::from_secs(1), async {
            bus.publish(RasEvent::new(RasId::EngineDied)).await;
            bus.reset().await;
        })
        .await
        .expect("submit must be bounded");
    }
}
