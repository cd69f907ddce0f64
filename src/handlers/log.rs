//! # LogWriter: RAS events to `tracing`
//!
//! Writes every delivered event as one structured `tracing` record, at a level
//! picked from the event severity:
//!
//! | severity  | level   |
//! |-----------|---------|
//! | `Error`   | `error` |
//! | `Warning` | `warn`  |
//! | `Notice`  | `info`  |
//! | `Unknown` | `debug` |
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR raspubsub::ras: RAS event id=swim_rank_dead rank=1 host="node-a" forwarded=false
//!     event=id: [swim_rank_dead] ts: [...] host: [node-a] type: [STATE_CHANGE] sev: [ERROR] ...
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::events::{NIL_RANK, RasEvent, RasSeverity};
use crate::handlers::Handler;

/// Logging handler; subscribe it to [`RasType::Any`](crate::RasType::Any) to log everything.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for LogWriter {
    async fn on_event(&self, _ctx: &CancellationToken, e: &RasEvent) {
        let rank = (e.rank != NIL_RANK).then_some(e.rank);
        let forwarded = e.is_forwarded();
        match e.severity {
            RasSeverity::Error => {
                tracing::error!(target: "raspubsub::ras", id = %e.id, ?rank, host = %e.hostname, forwarded, event = %e, "RAS event");
            }
            RasSeverity::Warning => {
                tracing::warn!(target: "raspubsub::ras", id = %e.id, ?rank, host = %e.hostname, forwarded, event = %e, "RAS event");
            }
            RasSeverity::Notice => {
                tracing::info!(target: "raspubsub::ras", id = %e.id, ?rank, host = %e.hostname, forwarded, event = %e, "RAS event");
            }
            RasSeverity::Unknown => {
                tracing::debug!(target: "raspubsub::ras", id = %e.id, ?rank, host = %e.hostname, forwarded, event = %e, "RAS event");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
