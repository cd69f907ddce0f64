//! Extended info payloads attached to RAS events.
//!
//! [`ExtendedInfo`] is a closed union; the variant an event carries is implied
//! by its [`RasId`](super::RasId) (see [`RasId::info_kind`](super::RasId::info_kind)).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::InfoKind;

/// Rank/engine state-change detail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStateInfo {
    /// Engine instance index on the host.
    pub instance: u32,
    /// Error the engine exited with, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_err: Option<String>,
}

/// Pool service replica detail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolSvcInfo {
    /// Ranks hosting pool service replicas.
    pub svc_reps: Vec<u32>,
    /// Raft leadership term of the reporting leader.
    pub version: u64,
}

/// Variant payload of a RAS event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedInfo {
    Str(String),
    EngineState(EngineStateInfo),
    PoolSvc(PoolSvcInfo),
}

impl ExtendedInfo {
    pub fn kind(&self) -> InfoKind {
        match self {
            ExtendedInfo::Str(_) => InfoKind::Str,
            ExtendedInfo::EngineState(_) => InfoKind::EngineState,
            ExtendedInfo::PoolSvc(_) => InfoKind::PoolSvc,
        }
    }
}

impl From<EngineStateInfo> for ExtendedInfo {
    fn from(info: EngineStateInfo) -> Self {
        ExtendedInfo::EngineState(info)
    }
}

impl From<PoolSvcInfo> for ExtendedInfo {
    fn from(info: PoolSvcInfo) -> Self {
        ExtendedInfo::PoolSvc(info)
    }
}

impl fmt::Display for ExtendedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtendedInfo::Str(data) => write!(f, "data: [{data}]"),
            ExtendedInfo::EngineState(info) => {
                write!(f, "instance: [{}]", info.instance)?;
                if let Some(err) = info.exit_err.as_deref() {
                    write!(f, " exit_err: [{err}]")?;
                }
                Ok(())
            }
            ExtendedInfo::PoolSvc(info) => {
                let reps: Vec<String> = info.svc_reps.iter().map(u32::to_string).collect();
                write!(f, "svc_reps: [{}] version: [{}]", reps.join(","), info.version)
            }
        }
    }
}
