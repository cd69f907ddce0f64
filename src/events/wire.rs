//! # Cluster wire envelope.
//!
//! [`WireEvent`] is the transport-facing shape of a [`RasEvent`]: enumerations
//! travel as numbers and extended info as a tagged union with exactly one of
//! three shapes. Transports serialize these types however they like (they
//! derive serde); this module only converts between them and the event model.
//!
//! ## Rules
//! - Decoding an unknown extended info tag fails with
//!   [`RasError::UnknownExtendedInfo`].
//! - Decoding a missing event fails with [`RasError::NilEvent`].
//! - Extended info whose shape is not the one the id implies fails with
//!   [`RasError::ExtendedInfoMismatch`], as in the JSON form.
//! - Decoded events always start "not forwarded, forwardable"; the receiver
//!   decides whether to mark them forwarded.

use serde::{Deserialize, Serialize};

use crate::error::RasError;

use super::event::{NIL_RANK, RasEvent};
use super::id::{RasId, RasSeverity, RasType};
use super::info::{EngineStateInfo, ExtendedInfo, PoolSvcInfo};

/// Tagged extended info payload as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "info", rename_all = "snake_case")]
pub enum WireExtendedInfo {
    /// Free-form string blob.
    StrInfo(String),
    /// Engine state triple; `error` is meaningful only when `errored`.
    EngineStateInfo {
        instance: u32,
        errored: bool,
        error: String,
    },
    /// Pool service replica ranks and leadership term.
    PoolSvcInfo { svc_reps: Vec<u32>, version: u64 },
    /// A tag sent by a peer this build does not understand.
    #[serde(other)]
    Unknown,
}

/// Event as carried between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    pub id: u32,
    pub msg: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: u32,
    pub severity: u32,
    pub hostname: String,
    pub rank: u32,
    pub incarnation: u64,
    pub hw_id: String,
    pub proc_id: u64,
    pub thread_id: u64,
    pub job_id: String,
    pub pool_uuid: String,
    pub cont_uuid: String,
    pub obj_id: String,
    pub ctl_op: String,
    pub extended_info: Option<WireExtendedInfo>,
}

impl Default for WireEvent {
    fn default() -> Self {
        Self {
            id: 0,
            msg: String::new(),
            timestamp: String::new(),
            event_type: 0,
            severity: 0,
            hostname: String::new(),
            rank: NIL_RANK,
            incarnation: 0,
            hw_id: String::new(),
            proc_id: 0,
            thread_id: 0,
            job_id: String::new(),
            pool_uuid: String::new(),
            cont_uuid: String::new(),
            obj_id: String::new(),
            ctl_op: String::new(),
            extended_info: None,
        }
    }
}

/// Request a node sends to relay an event to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEventReq {
    /// Sender-assigned sequence number, echoed in the response.
    pub sequence: u64,
    pub event: Option<WireEvent>,
    /// Whether the event should be marked forwarded on the receiving node.
    pub forwarded: bool,
}

/// Acknowledgement for a [`ClusterEventReq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEventResp {
    pub sequence: u64,
    pub status: i32,
}

impl From<&ExtendedInfo> for WireExtendedInfo {
    fn from(info: &ExtendedInfo) -> Self {
        match info {
            ExtendedInfo::Str(data) => WireExtendedInfo::StrInfo(data.clone()),
            ExtendedInfo::EngineState(info) => WireExtendedInfo::EngineStateInfo {
                instance: info.instance,
                errored: info.exit_err.is_some(),
                error: info.exit_err.clone().unwrap_or_default(),
            },
            ExtendedInfo::PoolSvc(info) => WireExtendedInfo::PoolSvcInfo {
                svc_reps: info.svc_reps.clone(),
                version: info.version,
            },
        }
    }
}

impl TryFrom<WireExtendedInfo> for ExtendedInfo {
    type Error = RasError;

    fn try_from(info: WireExtendedInfo) -> Result<Self, Self::Error> {
        match info {
            WireExtendedInfo::StrInfo(data) => Ok(ExtendedInfo::Str(data)),
            WireExtendedInfo::EngineStateInfo {
                instance,
                errored,
                error,
            } => Ok(ExtendedInfo::EngineState(EngineStateInfo {
                instance,
                exit_err: errored.then_some(error),
            })),
            WireExtendedInfo::PoolSvcInfo { svc_reps, version } => {
                Ok(ExtendedInfo::PoolSvc(PoolSvcInfo { svc_reps, version }))
            }
            WireExtendedInfo::Unknown => Err(RasError::UnknownExtendedInfo),
        }
    }
}

impl From<&RasEvent> for WireEvent {
    fn from(ev: &RasEvent) -> Self {
        Self {
            id: ev.id.into(),
            msg: ev.msg.clone(),
            timestamp: ev.timestamp.clone(),
            event_type: ev.event_type.into(),
            severity: ev.severity.into(),
            hostname: ev.hostname.clone(),
            rank: ev.rank,
            incarnation: ev.incarnation,
            hw_id: ev.hw_id.clone(),
            proc_id: ev.proc_id,
            thread_id: ev.thread_id,
            job_id: ev.job_id.clone(),
            pool_uuid: ev.pool_uuid.clone(),
            cont_uuid: ev.cont_uuid.clone(),
            obj_id: ev.obj_id.clone(),
            ctl_op: ev.ctl_op.clone(),
            extended_info: ev.extended_info.as_ref().map(WireExtendedInfo::from),
        }
    }
}

impl TryFrom<WireEvent> for RasEvent {
    type Error = RasError;

    fn try_from(w: WireEvent) -> Result<Self, Self::Error> {
        let id = RasId::try_from(w.id)?;
        let mut ev = RasEvent::new(id);
        ev.msg = w.msg;
        ev.timestamp = w.timestamp;
        ev.event_type = RasType::try_from(w.event_type)?;
        ev.severity = RasSeverity::try_from(w.severity)?;
        ev.hostname = w.hostname;
        ev.rank = w.rank;
        ev.incarnation = w.incarnation;
        ev.hw_id = w.hw_id;
        ev.proc_id = w.proc_id;
        ev.thread_id = w.thread_id;
        ev.job_id = w.job_id;
        ev.pool_uuid = w.pool_uuid;
        ev.cont_uuid = w.cont_uuid;
        ev.obj_id = w.obj_id;
        ev.ctl_op = w.ctl_op;
        ev.extended_info = w.extended_info.map(ExtendedInfo::try_from).transpose()?;
        if ev.extended_info.as_ref().is_some_and(|info| info.kind() != id.info_kind()) {
            return Err(RasError::ExtendedInfoMismatch { id });
        }
        ev.reset_forwarding();
        Ok(ev)
    }
}

impl RasEvent {
    /// Converts the event into its wire envelope.
    pub fn to_wire(&self) -> WireEvent {
        WireEvent::from(self)
    }

    /// Decodes an event from a wire envelope; `None` is a nil event.
    pub fn from_wire(wire: Option<WireEvent>) -> Result<Self, RasError> {
        wire.ok_or(RasError::NilEvent)?.try_into()
    }
}
