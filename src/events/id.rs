//! # Event identity and classification.
//!
//! [`RasId`] names every RAS event in a numbering space shared by all nodes of
//! the cluster; the numeric value is what travels on the wire and in JSON. The
//! id alone determines the default [`RasType`], the default [`RasSeverity`] and
//! the [`InfoKind`] of extended info an event is expected to carry.
//!
//! [`RasType`] doubles as the dispatch **topic**: handlers subscribe to a type,
//! and [`RasType::Any`] is the wildcard topic.

use std::fmt;

use crate::error::RasError;

/// Shape of extended info expected for an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    /// Free-form string blob.
    Str,
    /// Rank/engine state-change detail.
    EngineState,
    /// Pool service replica detail.
    PoolSvc,
}

macro_rules! ras_ids {
    ($( $(#[$doc:meta])* $variant:ident = $value:literal => $name:literal ),+ $(,)?) => {
        /// Identity of a RAS event.
        ///
        /// Discriminants are stable and shared across the cluster.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum RasId {
            $( $(#[$doc])* $variant = $value, )+
        }

        impl RasId {
            /// Every known id, in numeric order.
            pub const ALL: &'static [RasId] = &[$( RasId::$variant ),+];

            /// Stable snake_case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( RasId::$variant => $name, )+
                }
            }
        }

        impl TryFrom<u32> for RasId {
            type Error = RasError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(RasId::$variant), )+
                    other => Err(RasError::UnknownId(other)),
                }
            }
        }
    };
}

ras_ids! {
    /// Placeholder for an unclassified event.
    UnknownEvent = 0 => "unknown_event",
    /// Engine storage must be formatted before it can start.
    EngineFormatRequired = 1 => "engine_format_required",
    /// Engine process exited unexpectedly.
    EngineDied = 2 => "engine_died",
    /// Engine hit an assertion.
    EngineAsserted = 3 => "engine_asserted",
    /// Engine clock drifted beyond tolerance.
    EngineClockDrift = 4 => "engine_clock_drift",
    /// Pool data corruption detected.
    PoolCorruptionDetected = 5 => "pool_corruption_detected",
    /// Pool rebuild started.
    PoolRebuildStart = 6 => "pool_rebuild_started",
    /// Pool rebuild finished.
    PoolRebuildEnd = 7 => "pool_rebuild_finished",
    /// Pool rebuild failed.
    PoolRebuildFailed = 8 => "pool_rebuild_failed",
    /// Pool service replica membership changed.
    PoolRepsUpdate = 9 => "pool_replicas_updated",
    /// Pool durable format is incompatible.
    PoolDfIncompat = 10 => "pool_durable_format_incompatible",
    /// Container durable format is incompatible.
    ContDfIncompat = 11 => "container_durable_format_incompatible",
    /// Replicated database durable format is incompatible.
    RdbDfIncompat = 12 => "rdb_durable_format_incompatible",
    /// Membership protocol marked a rank alive.
    SwimRankAlive = 13 => "swim_rank_alive",
    /// Membership protocol marked a rank dead.
    SwimRankDead = 14 => "swim_rank_dead",
    /// System start failed.
    SystemStartFailed = 15 => "system_start_failed",
    /// System stop failed.
    SystemStopFailed = 16 => "system_stop_failed",
    /// Storage device marked faulty.
    DeviceSetFaulty = 17 => "device_set_faulty",
    /// Storage device reported a media error.
    DeviceMediaError = 18 => "device_media_error",
    /// Storage device unplugged.
    DeviceUnplugged = 19 => "device_unplugged",
    /// Storage device plugged.
    DevicePlugged = 20 => "device_plugged",
    /// Storage device replaced.
    DeviceReplace = 21 => "device_replace",
    /// Fabric provider changed across the system.
    SystemFabricProvChanged = 22 => "system_fabric_provider_changed",
    /// Engine failed to join the system.
    EngineJoinFailed = 23 => "engine_join_failed",
}

impl RasId {
    /// Extended info shape carried by events with this id.
    pub fn info_kind(&self) -> InfoKind {
        match self {
            RasId::EngineDied | RasId::SwimRankAlive | RasId::SwimRankDead => InfoKind::EngineState,
            RasId::PoolRepsUpdate => InfoKind::PoolSvc,
            _ => InfoKind::Str,
        }
    }

    /// Type assigned when an event of this id does not set one.
    pub fn default_type(&self) -> RasType {
        match self {
            RasId::EngineDied
            | RasId::SwimRankAlive
            | RasId::SwimRankDead
            | RasId::PoolRepsUpdate
            | RasId::DeviceSetFaulty
            | RasId::DeviceUnplugged
            | RasId::DevicePlugged
            | RasId::DeviceReplace => RasType::StateChange,
            _ => RasType::InfoOnly,
        }
    }

    /// Severity assigned when an event of this id does not set one.
    pub fn default_severity(&self) -> RasSeverity {
        match self {
            RasId::UnknownEvent => RasSeverity::Unknown,
            RasId::EngineDied
            | RasId::EngineAsserted
            | RasId::SwimRankDead
            | RasId::PoolCorruptionDetected
            | RasId::PoolRebuildFailed
            | RasId::SystemStartFailed
            | RasId::SystemStopFailed
            | RasId::DeviceMediaError
            | RasId::EngineJoinFailed => RasSeverity::Error,
            RasId::EngineClockDrift
            | RasId::PoolDfIncompat
            | RasId::ContDfIncompat
            | RasId::RdbDfIncompat
            | RasId::DeviceSetFaulty
            | RasId::DeviceUnplugged => RasSeverity::Warning,
            _ => RasSeverity::Notice,
        }
    }
}

impl fmt::Display for RasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RasId> for u32 {
    fn from(id: RasId) -> u32 {
        id as u32
    }
}

/// Event classification, also used as the dispatch topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum RasType {
    /// Wildcard topic; matches every event.
    #[default]
    Any = 0,
    /// Event reports a change of system state.
    StateChange = 1,
    /// Event is informational only.
    InfoOnly = 2,
}

impl RasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasType::Any => "ANY",
            RasType::StateChange => "STATE_CHANGE",
            RasType::InfoOnly => "INFO_ONLY",
        }
    }
}

impl fmt::Display for RasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u32> for RasType {
    type Error = RasError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RasType::Any),
            1 => Ok(RasType::StateChange),
            2 => Ok(RasType::InfoOnly),
            other => Err(RasError::UnknownType(other)),
        }
    }
}

impl From<RasType> for u32 {
    fn from(ty: RasType) -> u32 {
        ty as u32
    }
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum RasSeverity {
    #[default]
    Unknown = 0,
    Error = 1,
    Warning = 2,
    Notice = 3,
}

impl RasSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasSeverity::Unknown => "UNKNOWN",
            RasSeverity::Error => "ERROR",
            RasSeverity::Warning => "WARNING",
            RasSeverity::Notice => "NOTICE",
        }
    }
}

impl fmt::Display for RasSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u32> for RasSeverity {
    type Error = RasError;

    // `Self::Error` would name the `Error` variant here.
    fn try_from(value: u32) -> Result<Self, RasError> {
        match value {
            0 => Ok(RasSeverity::Unknown),
            1 => Ok(RasSeverity::Error),
            2 => Ok(RasSeverity::Warning),
            3 => Ok(RasSeverity::Notice),
            other => Err(RasError::UnknownSeverity(other)),
        }
    }
}

impl From<RasSeverity> for u32 {
    fn from(sev: RasSeverity) -> u32 {
        sev as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_numbering_is_dense_and_stable() {
        for (i, id) in RasId::ALL.iter().enumerate() {
            assert_eq!(u32::from(*id), i as u32, "id {id} out of place");
            assert_eq!(RasId::try_from(i as u32).unwrap(), *id);
        }
    }

    #[test]
    fn test_unknown_numeric_values_rejected() {
        let past_end = RasId::ALL.len() as u32;
        assert!(matches!(
            RasId::try_from(past_end),
            Err(RasError::UnknownId(v)) if v == past_end
        ));
        assert!(matches!(RasType::try_from(3), Err(RasError::UnknownType(3))));
        assert!(matches!(
            RasSeverity::try_from(4),
            Err(RasError::UnknownSeverity(4))
        ));
    }

    #[test]
    fn test_severity_numbers() {
        for sev in [
            RasSeverity::Unknown,
            RasSeverity::Error,
            RasSeverity::Warning,
            RasSeverity::Notice,
        ] {
            assert_eq!(RasSeverity::try_from(u32::from(sev)).unwrap(), sev);
        }
        assert_eq!(u32::from(RasSeverity::Error), 1);
    }

    #[test]
    fn test_id_determines_defaults() {
        assert_eq!(RasId::SwimRankDead.default_type(), RasType::StateChange);
        assert_eq!(RasId::SwimRankDead.default_severity(), RasSeverity::Error);
        assert_eq!(RasId::SwimRankDead.info_kind(), InfoKind::EngineState);

        assert_eq!(RasId::PoolRepsUpdate.info_kind(), InfoKind::PoolSvc);
        assert_eq!(RasId::PoolRepsUpdate.default_severity(), RasSeverity::Notice);

        assert_eq!(RasId::EngineFormatRequired.default_type(), RasType::InfoOnly);
        assert_eq!(RasId::EngineFormatRequired.info_kind(), InfoKind::Str);
    }

    #[test]
    fn test_names() {
        assert_eq!(RasId::EngineDied.to_string(), "engine_died");
        assert_eq!(RasType::StateChange.to_string(), "STATE_CHANGE");
        assert_eq!(RasSeverity::Warning.to_string(), "WARNING");
    }
}
