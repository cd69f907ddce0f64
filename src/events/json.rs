//! JSON form of [`RasEvent`].
//!
//! Enumerations are projected to their numeric values. Extended info is written
//! untagged; on decode its shape is chosen by the event id, and a payload that
//! does not fit that shape is rejected.
//!
//! ```text
//! {"id":2,"msg":"...","timestamp":"...","type":1,"severity":1,
//!  "hostname":"node-a","rank":1,"incarnation":0,"proc_id":4242,
//!  "extended_info":{"instance":1,"exit_err":"signal: killed"}}
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::RasError;

use super::event::{NIL_RANK, RasEvent};
use super::id::{InfoKind, RasId, RasSeverity, RasType};
use super::info::{EngineStateInfo, ExtendedInfo, PoolSvcInfo};

fn nil_rank() -> u32 {
    NIL_RANK
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

#[derive(Serialize, Deserialize)]
struct JsonEvent {
    id: u32,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    timestamp: String,
    #[serde(rename = "type", default)]
    event_type: u32,
    #[serde(default)]
    severity: u32,
    #[serde(default)]
    hostname: String,
    #[serde(default = "nil_rank")]
    rank: u32,
    #[serde(default)]
    incarnation: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    hw_id: String,
    #[serde(default)]
    proc_id: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    thread_id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    job_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pool_uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    cont_uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    obj_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ctl_op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extended_info: Option<Value>,
}

fn info_to_value(info: &ExtendedInfo) -> Result<Value, serde_json::Error> {
    match info {
        ExtendedInfo::Str(data) => Ok(Value::String(data.clone())),
        ExtendedInfo::EngineState(info) => serde_json::to_value(info),
        ExtendedInfo::PoolSvc(info) => serde_json::to_value(info),
    }
}

fn info_from_value(id: RasId, value: Value) -> Result<ExtendedInfo, RasError> {
    let mismatch = |_| RasError::ExtendedInfoMismatch { id };
    match id.info_kind() {
        InfoKind::Str => match value {
            Value::String(data) => Ok(ExtendedInfo::Str(data)),
            _ => Err(RasError::ExtendedInfoMismatch { id }),
        },
        InfoKind::EngineState => serde_json::from_value::<EngineStateInfo>(value)
            .map(ExtendedInfo::EngineState)
            .map_err(mismatch),
        InfoKind::PoolSvc => serde_json::from_value::<PoolSvcInfo>(value)
            .map(ExtendedInfo::PoolSvc)
            .map_err(mismatch),
    }
}

impl JsonEvent {
    fn from_event(ev: &RasEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
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
            extended_info: ev.extended_info.as_ref().map(info_to_value).transpose()?,
        })
    }

    fn into_event(self) -> Result<RasEvent, RasError> {
        let id = RasId::try_from(self.id)?;
        let mut ev = RasEvent::new(id);
        ev.msg = self.msg;
        ev.timestamp = self.timestamp;
        ev.event_type = RasType::try_from(self.event_type)?;
        ev.severity = RasSeverity::try_from(self.severity)?;
        ev.hostname = self.hostname;
        ev.rank = self.rank;
        ev.incarnation = self.incarnation;
        ev.hw_id = self.hw_id;
        ev.proc_id = self.proc_id;
        ev.thread_id = self.thread_id;
        ev.job_id = self.job_id;
        ev.pool_uuid = self.pool_uuid;
        ev.cont_uuid = self.cont_uuid;
        ev.obj_id = self.obj_id;
        ev.ctl_op = self.ctl_op;
        ev.extended_info = self
            .extended_info
            .filter(|v| !v.is_null())
            .map(|v| info_from_value(id, v))
            .transpose()?;
        Ok(ev)
    }
}

impl Serialize for RasEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonEvent::from_event(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RasEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonEvent::deserialize(deserializer)?
            .into_event()
            .map_err(serde::de::Error::custom)
    }
}

impl RasEvent {
    /// Encodes the event as a JSON document.
    pub fn to_json(&self) -> Result<String, RasError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an event from a JSON document.
    ///
    /// Forwarding flags start as "not forwarded, forwardable".
    pub fn from_json(data: &str) -> Result<Self, RasError> {
        let value: JsonEvent = serde_json::from_str(data)?;
        value.into_event()
    }
}
