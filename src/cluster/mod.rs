//! Cluster forwarding: inbound service and outbound forwarder.

mod forwarder;
mod service;

pub use forwarder::{ClusterEventSink, Forwarder};
pub use service::ClusterEventService;
