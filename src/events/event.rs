//! # RAS event value object.
//!
//! A [`RasEvent`] is built once (builder methods consume `self`), completed by
//! [`RasEvent::with_defaults`], then shared read-only as `Arc<RasEvent>` between
//! the coordinator loop and handler tasks.
//!
//! Only the two forwarding flags may change after the event is shared; they are
//! atomics so any task holding the `Arc` can read or set them:
//! - `forwarded`: event arrived from another node and must not be relayed again;
//! - `forwardable`: event may be relayed over the network at all.
//!
//! ## Example
//! ```rust
//! use raspubsub::{ExtendedInfo, RasEvent, RasId, RasSeverity, RasType};
//!
//! let ev = RasEvent::new(RasId::EngineClockDrift)
//!     .with_msg("clock drift detected")
//!     .with_rank(3)
//!     .with_extended_info(ExtendedInfo::Str("offset=2.5s".into()))
//!     .with_defaults();
//!
//! assert_eq!(ev.event_type, RasType::InfoOnly);
//! assert_eq!(ev.severity, RasSeverity::Warning);
//! assert!(!ev.hostname.is_empty());
//! assert!(ev.should_forward());
//! ```

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use chrono::{Local, SecondsFormat};

use super::id::{RasId, RasSeverity, RasType};
use super::info::ExtendedInfo;

/// Rank value meaning "not associated with a rank".
pub const NIL_RANK: u32 = u32::MAX;

/// A RAS event.
///
/// Equality compares every public field and ignores the forwarding flags.
#[derive(Debug)]
pub struct RasEvent {
    /// Identity in the shared numbering space.
    pub id: RasId,
    /// Human-readable message.
    pub msg: String,
    /// RFC 3339 timestamp (microsecond precision).
    pub timestamp: String,
    /// Classification; also the dispatch topic.
    pub event_type: RasType,
    pub severity: RasSeverity,
    /// Origin host.
    pub hostname: String,
    /// Cluster rank, or [`NIL_RANK`].
    pub rank: u32,
    /// Distinguishes successive process lifetimes of the same rank.
    pub incarnation: u64,
    pub hw_id: String,
    pub proc_id: u64,
    pub thread_id: u64,
    pub job_id: String,
    pub pool_uuid: String,
    pub cont_uuid: String,
    pub obj_id: String,
    /// Control-plane operation that raised the event.
    pub ctl_op: String,
    pub extended_info: Option<ExtendedInfo>,

    forwarded: AtomicBool,
    forwardable: AtomicBool,
}

impl RasEvent {
    /// Creates a bare event for `id`.
    ///
    /// Classification starts as `Any`/`Unknown` and rank as [`NIL_RANK`];
    /// call [`with_defaults`](Self::with_defaults) once all fields are set.
    pub fn new(id: RasId) -> Self {
        Self {
            id,
            msg: String::new(),
            timestamp: String::new(),
            event_type: RasType::Any,
            severity: RasSeverity::Unknown,
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
            forwarded: AtomicBool::new(false),
            forwardable: AtomicBool::new(true),
        }
    }

    /// Fills absent timestamp, hostname, process id, type and severity, and
    /// resets forwarding state to "not forwarded, forwardable".
    ///
    /// Type and severity fall back to the id's defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.timestamp.is_empty() {
            self.timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        }
        if self.hostname.is_empty() {
            self.hostname = local_hostname().to_owned();
        }
        if self.proc_id == 0 {
            self.proc_id = u64::from(std::process::id());
        }
        if self.event_type == RasType::Any {
            self.event_type = self.id.default_type();
        }
        if self.severity == RasSeverity::Unknown {
            self.severity = self.id.default_severity();
        }
        self.reset_forwarding();
        self
    }

    #[inline]
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    #[inline]
    pub fn with_timestamp(mut self, ts: impl Into<String>) -> Self {
        self.timestamp = ts.into();
        self
    }

    #[inline]
    pub fn with_type(mut self, ty: RasType) -> Self {
        self.event_type = ty;
        self
    }

    #[inline]
    pub fn with_severity(mut self, sev: RasSeverity) -> Self {
        self.severity = sev;
        self
    }

    #[inline]
    pub fn with_hostname(mut self, host: impl Into<String>) -> Self {
        self.hostname = host.into();
        self
    }

    #[inline]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    #[inline]
    pub fn with_incarnation(mut self, inc: u64) -> Self {
        self.incarnation = inc;
        self
    }

    #[inline]
    pub fn with_hw_id(mut self, hw_id: impl Into<String>) -> Self {
        self.hw_id = hw_id.into();
        self
    }

    #[inline]
    pub fn with_proc_id(mut self, pid: u64) -> Self {
        self.proc_id = pid;
        self
    }

    #[inline]
    pub fn with_thread_id(mut self, tid: u64) -> Self {
        self.thread_id = tid;
        self
    }

    #[inline]
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    #[inline]
    pub fn with_pool(mut self, pool_uuid: impl Into<String>) -> Self {
        self.pool_uuid = pool_uuid.into();
        self
    }

    #[inline]
    pub fn with_container(mut self, cont_uuid: impl Into<String>) -> Self {
        self.cont_uuid = cont_uuid.into();
        self
    }

    #[inline]
    pub fn with_obj_id(mut self, obj_id: impl Into<String>) -> Self {
        self.obj_id = obj_id.into();
        self
    }

    #[inline]
    pub fn with_ctl_op(mut self, op: impl Into<String>) -> Self {
        self.ctl_op = op.into();
        self
    }

    #[inline]
    pub fn with_extended_info(mut self, info: impl Into<ExtendedInfo>) -> Self {
        self.extended_info = Some(info.into());
        self
    }

    /// Marks whether the event arrived from another node.
    #[inline]
    pub fn with_forwarded(self, forwarded: bool) -> Self {
        self.set_forwarded(forwarded);
        self
    }

    /// Marks whether the event may be relayed to other nodes.
    #[inline]
    pub fn with_forwardable(self, forwardable: bool) -> Self {
        self.set_forwardable(forwardable);
        self
    }

    pub fn set_forwarded(&self, forwarded: bool) {
        self.forwarded.store(forwarded, AtomicOrdering::Release);
    }

    pub fn set_forwardable(&self, forwardable: bool) {
        self.forwardable.store(forwardable, AtomicOrdering::Release);
    }

    pub fn is_forwarded(&self) -> bool {
        self.forwarded.load(AtomicOrdering::Acquire)
    }

    pub fn is_forwardable(&self) -> bool {
        self.forwardable.load(AtomicOrdering::Acquire)
    }

    /// True only if the event has not been forwarded yet and may be forwarded.
    ///
    /// This is the only guard against events bouncing between nodes forever.
    pub fn should_forward(&self) -> bool {
        !self.is_forwarded() && self.is_forwardable()
    }

    pub(crate) fn reset_forwarding(&self) {
        self.set_forwarded(false);
        self.set_forwardable(true);
    }
}

impl Clone for RasEvent {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            msg: self.msg.clone(),
            timestamp: self.timestamp.clone(),
            event_type: self.event_type,
            severity: self.severity,
            hostname: self.hostname.clone(),
            rank: self.rank,
            incarnation: self.incarnation,
            hw_id: self.hw_id.clone(),
            proc_id: self.proc_id,
            thread_id: self.thread_id,
            job_id: self.job_id.clone(),
            pool_uuid: self.pool_uuid.clone(),
            cont_uuid: self.cont_uuid.clone(),
            obj_id: self.obj_id.clone(),
            ctl_op: self.ctl_op.clone(),
            extended_info: self.extended_info.clone(),
            forwarded: AtomicBool::new(self.is_forwarded()),
            forwardable: AtomicBool::new(self.is_forwardable()),
        }
    }
}

impl PartialEq for RasEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.msg == other.msg
            && self.timestamp == other.timestamp
            && self.event_type == other.event_type
            && self.severity == other.severity
            && self.hostname == other.hostname
            && self.rank == other.rank
            && self.incarnation == other.incarnation
            && self.hw_id == other.hw_id
            && self.proc_id == other.proc_id
            && self.thread_id == other.thread_id
            && self.job_id == other.job_id
            && self.pool_uuid == other.pool_uuid
            && self.cont_uuid == other.cont_uuid
            && self.obj_id == other.obj_id
            && self.ctl_op == other.ctl_op
            && self.extended_info == other.extended_info
    }
}

impl Eq for RasEvent {}

impl fmt::Display for RasEvent {
    /// Renders the event on one line; optional fields appear only when set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: [{}] ts: [{}] host: [{}] type: [{}] sev: [{}] msg: [{}] pid: [{}]",
            self.id, self.timestamp, self.hostname, self.event_type, self.severity, self.msg, self.proc_id
        )?;
        if self.thread_id != 0 {
            write!(f, " tid: [{}]", self.thread_id)?;
        }
        if !self.hw_id.is_empty() {
            write!(f, " hwid: [{}]", self.hw_id)?;
        }
        if self.rank != NIL_RANK {
            write!(f, " rank: [{}]", self.rank)?;
        }
        if self.incarnation != 0 {
            write!(f, " inc: [{:#x}]", self.incarnation)?;
        }
        if !self.job_id.is_empty() {
            write!(f, " jobid: [{}]", self.job_id)?;
        }
        if !self.pool_uuid.is_empty() {
            write!(f, " pool: [{}]", self.pool_uuid)?;
        }
        if !self.cont_uuid.is_empty() {
            write!(f, " container: [{}]", self.cont_uuid)?;
        }
        if !self.obj_id.is_empty() {
            write!(f, " objid: [{}]", self.obj_id)?;
        }
        if !self.ctl_op.is_empty() {
            write!(f, " ctlop: [{}]", self.ctl_op)?;
        }
        if let Some(info) = &self.extended_info {
            write!(f, " {info}")?;
        }
        Ok(())
    }
}

/// Name of the local host, resolved once per process.
pub(crate) fn local_hostname() -> &'static str {
    static HOSTNAME: OnceLock<String> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        std::fs::read_to_string("/proc/sys/kernel/hostname")
            .ok()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .map(|h| h.trim().to_owned())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_owned())
    })
}
