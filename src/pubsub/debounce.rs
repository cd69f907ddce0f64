//! # Debounce: per-id duplicate suppression.
//!
//! A policy is registered per [`RasId`]: a key function deriving a string key
//! from the event, and a cooldown. History records, per id and key, the instant
//! of the most recent **attempt** (delivered or suppressed).
//!
//! ## Decision
//! ```text
//! no policy for id              → deliver
//! key never seen                → deliver,  last = now
//! cooldown == 0                 → suppress, last = now   (until pruned)
//! now - last <  cooldown        → suppress, last = now
//! now - last >= cooldown        → deliver,  last = now
//! ```
//!
//! Because suppressed attempts also move `last`, a stream of attempts spaced
//! closer than the cooldown is suppressed for as long as it lasts; only a quiet
//! gap of at least `cooldown` lets the next event through.
//!
//! ## Pruning
//! [`Debouncer::prune`] drops history of ids that no longer have a policy and
//! keys idle for longer than `cleanup_interval + cooldown`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::events::RasEvent;
use crate::events::RasId;

/// Derives the debounce key of an event.
pub type KeyFn = Arc<dyn Fn(&RasEvent) -> String + Send + Sync>;

/// Key made of rank and incarnation, so each process lifetime of a rank is
/// debounced on its own.
///
/// ```rust
/// use raspubsub::{RasEvent, RasId, rank_incarnation_key};
///
/// let ev = RasEvent::new(RasId::SwimRankDead).with_rank(3).with_incarnation(0x1f);
/// assert_eq!(rank_incarnation_key(&ev), "3:1f");
/// ```
pub fn rank_incarnation_key(ev: &RasEvent) -> String {
    format!("{}:{:x}", ev.rank, ev.incarnation)
}

#[derive(Clone)]
pub(crate) struct DebouncePolicy {
    pub(crate) cooldown: Duration,
    pub(crate) key_fn: KeyFn,
}

/// Policies and last-seen history, owned by the coordinator loop.
#[derive(Default)]
pub(crate) struct Debouncer {
    policies: HashMap<RasId, DebouncePolicy>,
    history: HashMap<RasId, HashMap<String, Instant>>,
}

impl Debouncer {
    /// Installs or replaces the policy for `id`.
    pub(crate) fn set_policy(&mut self, id: RasId, policy: DebouncePolicy) {
        self.policies.insert(id, policy);
    }

    /// Removes the policy for `id`; its history goes at the next prune.
    pub(crate) fn remove_policy(&mut self, id: RasId) {
        self.policies.remove(&id);
    }

    /// Evaluates `ev` at `now` and records the attempt.
    pub(crate) fn is_suppressed(&mut self, ev: &RasEvent, now: Instant) -> bool {
        let Some(policy) = self.policies.get(&ev.id) else {
            return false;
        };

        let key = (policy.key_fn)(ev);
        let seen = self.history.entry(ev.id).or_default();
        let Some(last) = seen.insert(key, now) else {
            return false;
        };

        policy.cooldown.is_zero() || now.saturating_duration_since(last) < policy.cooldown
    }

    /// Drops stale history; returns the number of keys removed.
    pub(crate) fn prune(&mut self, now: Instant, cleanup_interval: Duration) -> usize {
        let mut removed = 0;
        let policies = &self.policies;
        self.history.retain(|id, keys| {
            let Some(policy) = policies.get(id) else {
                removed += keys.len();
                return false;
            };
            let max_age = cleanup_interval.saturating_add(policy.cooldown);
            let before = keys.len();
            keys.retain(|_, last| now.saturating_duration_since(*last) <= max_age);
            removed += before - keys.len();
            !keys.is_empty()
        });
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.policies.clear();
        self.history.clear();
    }

    pub(crate) fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// Number of tracked keys across all ids.
    pub(crate) fn history_len(&self) -> usize {
        self.history.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(cooldown: Duration) -> DebouncePolicy {
        DebouncePolicy {
            cooldown,
            key_fn: Arc::new(rank_incarnation_key),
        }
    }

    fn rank_dead(rank: u32, inc: u64) -> RasEvent {
        RasEvent::new(RasId::SwimRankDead)
            .with_rank(rank)
            .with_incarnation(inc)
    }

    #[test]
    fn test_no_policy_never_suppresses() {
        let mut d = Debouncer::default();
        let now = Instant::now();
        for _ in 0..5 {
            assert!(!d.is_suppressed(&rank_dead(1, 1), now));
        }
        assert_eq!(d.history_len(), 0);
    }

    #[test]
    fn test_zero_cooldown_passes_first_only() {
        let mut d = Debouncer::default();
        d.set_policy(RasId::SwimRankDead, policy(Duration::ZERO));
        let start = Instant::now();

        assert!(!d.is_suppressed(&rank_dead(1, 1), start));
        for i in 1..=17u64 {
            let at = start + Duration::from_secs(i * 600);
            assert!(d.is_suppressed(&rank_dead(1, 1), at), "attempt {i}");
        }
        // A different key is a first occurrence.
        assert!(!d.is_suppressed(&rank_dead(1, 2), start));
    }

    #[test]
    fn test_window_measured_from_last_attempt() {
        let mut d = Debouncer::default();
        let cooldown = Duration::from_secs(10);
        d.set_policy(RasId::SwimRankDead, policy(cooldown));
        let t0 = Instant::now();
        let ev = rank_dead(2, 7);

        assert!(!d.is_suppressed(&ev, t0));
        // Attempts every 6s: each is within cooldown of the previous attempt,
        // even though 12s+ have passed since the delivered one.
        for step in 1..=5u64 {
            assert!(d.is_suppressed(&ev, t0 + Duration::from_secs(6 * step)));
        }
        // Quiet gap of exactly the cooldown lets the next one through.
        let last = t0 + Duration::from_secs(30);
        assert!(!d.is_suppressed(&ev, last + cooldown));
        assert!(d.is_suppressed(&ev, last + cooldown + Duration::from_secs(1)));
    }

    #[test]
    fn test_policy_replacement() {
        let mut d = Debouncer::default();
        d.set_policy(RasId::SwimRankDead, policy(Duration::ZERO));
        d.set_policy(RasId::SwimRankDead, policy(Duration::from_secs(1)));
        assert_eq!(d.policy_count(), 1);

        let t0 = Instant::now();
        assert!(!d.is_suppressed(&rank_dead(1, 1), t0));
        assert!(!d.is_suppressed(&rank_dead(1, 1), t0 + Duration::from_secs(2)));
    }

    #[test]
    fn test_prune_drops_idle_keys() {
        let mut d = Debouncer::default();
        let cooldown = Duration::from_secs(5);
        let interval = Duration::from_secs(60);
        d.set_policy(RasId::SwimRankDead, policy(cooldown));
        let t0 = Instant::now();

        d.is_suppressed(&rank_dead(1, 1), t0);
        d.is_suppressed(&rank_dead(2, 1), t0 + Duration::from_secs(30));
        assert_eq!(d.history_len(), 2);

        assert_eq!(d.prune(t0 + interval + cooldown, interval), 0);
        assert_eq!(d.prune(t0 + interval + cooldown + Duration::from_secs(1), interval), 1);
        assert_eq!(d.history_len(), 1);

        // A pruned key counts as first-seen again.
        let later = t0 + Duration::from_secs(100);
        assert!(!d.is_suppressed(&rank_dead(1, 1), later));
    }

    #[test]
    fn test_prune_drops_ids_without_policy() {
        let mut d = Debouncer::default();
        d.set_policy(RasId::SwimRankDead, policy(Duration::ZERO));
        let t0 = Instant::now();
        d.is_suppressed(&rank_dead(1, 1), t0);
        d.is_suppressed(&rank_dead(1, 2), t0);

        d.remove_policy(RasId::SwimRankDead);
        assert_eq!(d.history_len(), 2);
        assert_eq!(d.prune(t0, Duration::from_secs(3600)), 2);
        assert_eq!(d.history_len(), 0);
    }

    #[test]
    fn test_prune_with_unbounded_cooldown() {
        let mut d = Debouncer::default();
        d.set_policy(RasId::SwimRankDead, policy(Duration::MAX));
        let t0 = Instant::now();

        assert!(!d.is_suppressed(&rank_dead(1, 1), t0));
        assert!(d.is_suppressed(&rank_dead(1, 1), t0 + Duration::from_secs(3600)));
        assert_eq!(d.prune(t0 + Duration::from_secs(7200), Duration::from_secs(3600)), 0);
        assert_eq!(d.history_len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut d = Debouncer::default();
        d.set_policy(RasId::SwimRankDead, policy(Duration::ZERO));
        d.is_suppressed(&rank_dead(1, 1), Instant::now());
        d.clear();
        assert_eq!(d.policy_count(), 0);
        assert_eq!(d.history_len(), 0);
        assert!(!d.is_suppressed(&rank_dead(1, 1), Instant::now()));
    }
}
