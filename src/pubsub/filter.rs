//! Set of event ids disabled from publication.

use std::collections::HashSet;

use crate::events::RasId;

/// Disabled-id set, owned by the coordinator loop.
#[derive(Debug, Default)]
pub(crate) struct EventFilter {
    disabled: HashSet<RasId>,
}

impl EventFilter {
    pub(crate) fn disable(&mut self, ids: &[RasId]) {
        self.disabled.extend(ids.iter().copied());
    }

    pub(crate) fn enable(&mut self, ids: &[RasId]) {
        for id in ids {
            self.disabled.remove(id);
        }
    }

    pub(crate) fn is_disabled(&self, id: RasId) -> bool {
        self.disabled.contains(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.disabled.len()
    }
}
