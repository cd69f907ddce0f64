//! Event coordinator: filtering, debouncing and type-based fan-out.
//!
//! [`PubSub`] is the public handle; the filter, dispatch table and debounce
//! state are owned by its loop and never shared.

mod bus;
mod config;
mod debounce;
mod dispatch;
mod filter;
mod publisher;

pub use bus::PubSub;
pub use config::{MAX_CLEANUP_INTERVAL, PubSubConfig};
pub use debounce::{KeyFn, rank_incarnation_key};
pub use publisher::Publisher;
