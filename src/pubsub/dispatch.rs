//! Topic → handlers table, owned by the coordinator loop.
//!
//! ## Rules
//! - Handlers keep subscription order within a topic.
//! - [`RasType::Any`] subscriptions match every event.
//! - An event whose own type is `Any` matches only the wildcard list, so no
//!   handler is selected twice.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::RasType;
use crate::handlers::Handler;

#[derive(Default)]
pub(crate) struct DispatchTable {
    handlers: HashMap<RasType, Vec<Arc<dyn Handler>>>,
}

impl DispatchTable {
    pub(crate) fn subscribe(&mut self, topic: RasType, handler: Arc<dyn Handler>) {
        self.handlers.entry(topic).or_default().push(handler);
    }

    /// Wildcard handlers first, then handlers of `event_type`.
    pub(crate) fn matching(&self, event_type: RasType) -> impl Iterator<Item = &Arc<dyn Handler>> {
        let wildcard = self.handlers.get(&RasType::Any).into_iter().flatten();
        let typed = (event_type != RasType::Any)
            .then(|| self.handlers.get(&event_type))
            .flatten()
            .into_iter()
            .flatten();
        wildcard.chain(typed)
    }

    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Total number of subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}
