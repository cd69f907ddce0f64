//! Constructors for the events raised by the control plane.
//!
//! Each constructor sets the id, a message and the extended info the id calls
//! for, then applies [`RasEvent::with_defaults`]. An empty `hostname` means
//! "this host".

use std::fmt::Display;

use super::event::RasEvent;
use super::id::{RasId, RasSeverity, RasType};
use super::info::{EngineStateInfo, ExtendedInfo, PoolSvcInfo};

/// Engine process exited unexpectedly.
pub fn engine_died(
    hostname: &str,
    instance: u32,
    rank: u32,
    incarnation: u64,
    exit_err: impl Display,
    pid: u64,
) -> RasEvent {
    let exit_err = exit_err.to_string();
    RasEvent::new(RasId::EngineDied)
        .with_msg(format!("engine instance {instance} exited unexpectedly: {exit_err}"))
        .with_hostname(hostname)
        .with_rank(rank)
        .with_incarnation(incarnation)
        .with_proc_id(pid)
        .with_extended_info(EngineStateInfo {
            instance,
            exit_err: Some(exit_err),
        })
        .with_defaults()
}

/// Rank was marked down by the membership protocol.
///
/// An empty `reason` leaves the exit error unset.
pub fn rank_down(hostname: &str, instance: u32, rank: u32, incarnation: u64, reason: &str) -> RasEvent {
    let msg = if reason.is_empty() {
        format!("rank {rank} is down")
    } else {
        format!("rank {rank} is down: {reason}")
    };
    RasEvent::new(RasId::SwimRankDead)
        .with_msg(msg)
        .with_hostname(hostname)
        .with_rank(rank)
        .with_incarnation(incarnation)
        .with_extended_info(EngineStateInfo {
            instance,
            exit_err: (!reason.is_empty()).then(|| reason.to_owned()),
        })
        .with_defaults()
}

/// Pool service replica set changed under a new leadership term.
pub fn pool_svc_replicas_update(
    hostname: &str,
    rank: u32,
    pool_uuid: &str,
    svc_reps: Vec<u32>,
    leader_term: u64,
) -> RasEvent {
    RasEvent::new(RasId::PoolRepsUpdate)
        .with_msg("list of pool service replica ranks has been updated")
        .with_hostname(hostname)
        .with_rank(rank)
        .with_pool(pool_uuid)
        .with_extended_info(PoolSvcInfo {
            svc_reps,
            version: leader_term,
        })
        .with_defaults()
}

/// Engine storage needs formatting before the engine can start.
///
/// Informational and local to the host, so never relayed.
pub fn engine_format_required(hostname: &str, instance: u32, format_type: &str) -> RasEvent {
    RasEvent::new(RasId::EngineFormatRequired)
        .with_msg(format!("engine instance {instance} requires a {format_type} format"))
        .with_hostname(hostname)
        .with_extended_info(ExtendedInfo::Str(format!("instance={instance}")))
        .with_defaults()
        .with_forwardable(false)
}

/// Informational event carrying a free-form data blob.
pub fn generic(id: RasId, severity: RasSeverity, msg: &str, data: &str) -> RasEvent {
    let ev = RasEvent::new(id)
        .with_msg(msg)
        .with_type(RasType::InfoOnly)
        .with_severity(severity);
    let ev = if data.is_empty() {
        ev
    } else {
        ev.with_extended_info(ExtendedInfo::Str(data.to_owned()))
    };
    ev.with_defaults()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NIL_RANK;

    #[test]
    fn test_rank_down() {
        let ev = rank_down("node-a", 1, 1, 0x10, "");
        assert_eq!(ev.id, RasId::SwimRankDead);
        assert_eq!(ev.event_type, RasType::StateChange);
        assert_eq!(ev.severity, RasSeverity::Error);
        assert_eq!(ev.msg, "rank 1 is down");
        assert_eq!(
            ev.extended_info,
            Some(ExtendedInfo::EngineState(EngineStateInfo {
                instance: 1,
                exit_err: None
            }))
        );
        assert!(ev.should_forward());

        let ev = rank_down("node-a", 1, 1, 0x10, "missed heartbeats");
        assert_eq!(ev.msg, "rank 1 is down: missed heartbeats");
    }

    #[test]
    fn test_engine_died_records_exit() {
        let ev = engine_died("", 0, 5, 2, "signal: killed", 4242);
        assert_eq!(ev.proc_id, 4242);
        assert!(!ev.hostname.is_empty());
        assert_eq!(ev.rank, 5);
        match ev.extended_info {
            Some(ExtendedInfo::EngineState(info)) => {
                assert_eq!(info.exit_err.as_deref(), Some("signal: killed"));
            }
            other => panic!("unexpected extended info {other:?}"),
        }
    }

    #[test]
    fn test_pool_update_and_format_required() {
        let ev = pool_svc_replicas_update("node-b", 2, "pool-uuid", vec![2, 3], 9);
        assert_eq!(ev.pool_uuid, "pool-uuid");
        assert_eq!(ev.event_type, RasType::StateChange);
        assert_eq!(ev.severity, RasSeverity::Notice);

        let ev = engine_format_required("node-b", 0, "SCM");
        assert_eq!(ev.event_type, RasType::InfoOnly);
        assert_eq!(ev.rank, NIL_RANK);
        assert!(!ev.should_forward());
    }

    #[test]
    fn test_generic_is_info_only() {
        let ev = generic(RasId::SystemStopFailed, RasSeverity::Warning, "stop failed", "");
        assert_eq!(ev.event_type, RasType::InfoOnly);
        assert_eq!(ev.severity, RasSeverity::Warning);
        assert!(ev.extended_info.is_none());

        let ev = generic(RasId::UnknownEvent, RasSeverity::Unknown, "msg", "blob");
        assert_eq!(ev.extended_info, Some(ExtendedInfo::Str("blob".into())));
        assert_eq!(ev.severity, RasSeverity::Unknown);
    }
}
