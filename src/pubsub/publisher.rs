use std::sync::Arc;

use async_trait::async_trait;

use crate::events::RasEvent;

/// Capability to publish RAS events.
///
/// Implemented by [`PubSub`](crate::PubSub); collaborators that only need to
/// publish (such as [`ClusterEventService`](crate::ClusterEventService)) take
/// this trait instead of the whole bus.
#[async_trait]
pub trait Publisher: Send + Sync + 'static {
    /// Best-effort publish; failures are logged, never returned.
    async fn publish(&self, event: Arc<RasEvent>);
}
