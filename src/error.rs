//! Error types used by the RAS event core.
//!
//! - [`RasError`] errors returned synchronously at the API boundary
//!   (malformed requests, undecodable wire or JSON payloads).
//! - [`SubmitError`] internal submission failures on the coordinator queue;
//!   these are logged and never surfaced to producers.
//!
//! Both provide `as_label` for logs.

use thiserror::Error;

use crate::events::RasId;

/// # Errors returned by event conversion and the cluster entry point.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RasError {
    /// Inbound cluster request was absent.
    #[error("nil cluster event request")]
    NilRequest,

    /// Event was absent (nil event on the wire or inside a request).
    #[error("nil event")]
    NilEvent,

    /// Wire envelope carried an extended info variant this build does not know.
    #[error("unknown extended info variant")]
    UnknownExtendedInfo,

    /// Numeric event id outside the shared numbering space.
    #[error("unknown RAS event id {0}")]
    UnknownId(u32),

    /// Numeric event type outside the known set.
    #[error("unknown RAS event type {0}")]
    UnknownType(u32),

    /// Numeric severity outside the known set.
    #[error("unknown RAS event severity {0}")]
    UnknownSeverity(u32),

    /// Extended info in a JSON document does not fit the shape implied by the id.
    #[error("extended info does not match event id {id}")]
    ExtendedInfoMismatch {
        /// Event id whose expected shape was violated.
        id: RasId,
    },

    /// JSON encode/decode failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl RasError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use raspubsub::RasError;
    ///
    /// assert_eq!(RasError::NilEvent.as_label(), "ras_nil_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RasError::NilRequest => "ras_nil_request",
            RasError::NilEvent => "ras_nil_event",
            RasError::UnknownExtendedInfo => "ras_unknown_extended_info",
            RasError::UnknownId(_) => "ras_unknown_id",
            RasError::UnknownType(_) => "ras_unknown_type",
            RasError::UnknownSeverity(_) => "ras_unknown_severity",
            RasError::ExtendedInfoMismatch { .. } => "ras_extended_info_mismatch",
            RasError::Json(_) => "ras_json",
        }
    }
}

/// Failure to hand a command to the coordinator loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitError {
    /// Queue stayed full for the whole submit timeout.
    #[error("submit timed out")]
    Timeout,

    /// Loop has exited (bus closed).
    #[error("coordinator closed")]
    Closed,
}

impl SubmitError {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Timeout => "submit_timeout",
            SubmitError::Closed => "submit_closed",
        }
    }
}
