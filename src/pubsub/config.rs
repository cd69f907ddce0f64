//! # Coordinator configuration.
//!
//! [`PubSubConfig`] centralizes the knobs of the [`PubSub`](crate::PubSub) loop.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1
//! - `submit_timeout = 0s` → clamped to 1ms (a send gets one chance)
//! - `cleanup_interval = 0s` → clamped to 1s
//! - `cleanup_interval` above [`MAX_CLEANUP_INTERVAL`] → clamped to it, so the
//!   tick deadline always fits in an `Instant`

use std::time::Duration;

/// Upper bound of the cleanup period (one year).
pub const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for the event coordinator.
///
/// ## Field semantics
/// - `submit_timeout`: how long a caller waits for room in the command queue
///   before its message is logged and dropped
/// - `cleanup_interval`: period of debounce history pruning; also part of the
///   age threshold (`cleanup_interval + cooldown`) after which keys are dropped
/// - `queue_capacity`: bounded command queue size
#[derive(Clone, Debug)]
pub struct PubSubConfig {
    /// Maximum wait to enqueue a command (publish, subscribe, filter, debounce, reset).
    pub submit_timeout: Duration,

    /// Period of debounce history pruning.
    pub cleanup_interval: Duration,

    /// Capacity of the coordinator command queue.
    pub queue_capacity: usize,
}

impl PubSubConfig {
    #[inline]
    pub fn submit_timeout_clamped(&self) -> Duration {
        self.submit_timeout.max(Duration::from_millis(1))
    }

    #[inline]
    pub fn cleanup_interval_clamped(&self) -> Duration {
        self.cleanup_interval
            .clamp(Duration::from_secs(1), MAX_CLEANUP_INTERVAL)
    }

    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for PubSubConfig {
    /// Default configuration:
    ///
    /// - `submit_timeout = 1s`
    /// - `cleanup_interval = 1h`
    /// - `queue_capacity = 1024`
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(1),
            cleanup_interval: Duration::from_secs(60 * 60),
            queue_capacity: 1024,
        }
    }
}
