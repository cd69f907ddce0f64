//! # Inbound cluster events.
//!
//! [`ClusterEventService`] is the entry point a transport calls when a peer
//! forwards an event. It decodes the envelope, applies the request's forwarded
//! flag and publishes the event locally.
//!
//! ## Flow
//! ```text
//! ClusterEventReq { sequence, event, forwarded }
//!     │
//!     ├─ None            → Err(NilRequest)
//!     ├─ event == None   → Err(NilEvent)
//!     ├─ decode fails    → Err(Unknown* / UnknownExtendedInfo)
//!     ▼
//! RasEvent (forwarded = req.forwarded) ──► Publisher::publish
//!     │
//!     ▼
//! ClusterEventResp { sequence, status: 0 }
//! ```

use std::sync::Arc;

use crate::error::RasError;
use crate::events::{ClusterEventReq, ClusterEventResp, RasEvent};
use crate::pubsub::Publisher;

/// Accepts events forwarded by peers and republishes them locally.
#[derive(Clone)]
pub struct ClusterEventService {
    publisher: Arc<dyn Publisher>,
}

impl ClusterEventService {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Handles one forwarded event.
    ///
    /// Publishing is best-effort: a full or closed bus is logged by the
    /// publisher and the response is still a success.
    pub async fn handle(&self, req: Option<ClusterEventReq>) -> Result<ClusterEventResp, RasError> {
        let req = req.ok_or(RasError::NilRequest)?;
        let event = RasEvent::from_wire(req.event)
            .inspect_err(|err| {
                tracing::warn!(sequence = req.sequence, reason = err.as_label(), "rejected cluster event");
            })?
            .with_forwarded(req.forwarded);

        tracing::debug!(sequence = req.sequence, id = %event.id, forwarded = req.forwarded, "cluster event received");
        self.publisher.publish(Arc::new(event)).await;

        Ok(ClusterEventResp {
            sequence: req.sequence,
            status: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RasId, WireEvent, WireExtendedInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured(Mutex<Vec<Arc<RasEvent>>>);

    #[async_trait]
    impl Publisher for Captured {
        async fn publish(&self, event: Arc<RasEvent>) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn service() -> (Arc<Captured>, ClusterEventService) {
        let captured = Arc::new(Captured::default());
        let svc = ClusterEventService::new(captured.clone());
        (captured, svc)
    }

    #[tokio::test]
    async fn test_nil_request_and_nil_event() {
        let (captured, svc) = service();

        let err = svc.handle(None).await.unwrap_err();
        assert!(matches!(err, RasError::NilRequest));

        let req = ClusterEventReq {
            sequence: 4,
            event: None,
            forwarded: true,
        };
        let err = svc.handle(Some(req)).await.unwrap_err();
        assert!(matches!(err, RasError::NilEvent));
        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publishes_with_request_forwarded_flag() {
        let (captured, svc) = service();
        let ev = RasEvent::new(RasId::SwimRankDead).with_rank(3).with_msg("rank 3 is down");

        for (seq, forwarded) in [(10, true), (11, false)] {
            let req = ClusterEventReq {
                sequence: seq,
                event: Some(ev.to_wire()),
                forwarded,
            };
            let resp = svc.handle(Some(req)).await.unwrap();
            assert_eq!(resp, ClusterEventResp { sequence: seq, status: 0 });
        }

        let got = captured.0.lock().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(*got[0], ev);
        assert!(got[0].is_forwarded());
        assert!(!got[0].should_forward());
        assert!(!got[1].is_forwarded());
        assert!(got[1].should_forward());
    }

    #[tokio::test]
    async fn test_undecodable_event_is_rejected() {
        let (captured, svc) = service();
        let req = ClusterEventReq {
            sequence: 1,
            event: Some(WireEvent {
                id: RasId::EngineDied.into(),
                extended_info: Some(WireExtendedInfo::Unknown),
                ..WireEvent::default()
            }),
            forwarded: true,
        };
        let err = svc.handle(Some(req)).await.unwrap_err();
        assert!(matches!(err, RasError::UnknownExtendedInfo));

        let req = ClusterEventReq {
            sequence: 2,
            event: Some(WireEvent {
                id: 9999,
                ..WireEvent::default()
            }),
            forwarded: false,
        };
        let err = svc.handle(Some(req)).await.unwrap_err();
        assert!(matches!(err, RasError::UnknownId(9999)));
        assert!(captured.0.lock().unwrap().is_empty());
    }
}
