//! RAS event model: identity, payloads, encodings.
//!
//! ## Contents
//! - [`RasId`], [`RasType`], [`RasSeverity`] identity and classification
//! - [`ExtendedInfo`] closed union of per-id payloads
//! - [`RasEvent`] the event value shared between producers and handlers
//! - JSON form (serde impls on [`RasEvent`]) and the cluster wire envelope
//!   ([`WireEvent`], [`ClusterEventReq`], [`ClusterEventResp`])
//! - [`constructors`] for the standard control-plane events

pub mod constructors;
mod event;
mod id;
mod info;
mod json;
mod wire;

pub use event::{NIL_RANK, RasEvent};
pub use id::{InfoKind, RasId, RasSeverity, RasType};
pub use info::{EngineStateInfo, ExtendedInfo, PoolSvcInfo};
pub use wire::{ClusterEventReq, ClusterEventResp, WireEvent, WireExtendedInfo};
