//! Read-only view of a component dependency graph.

use std::sync::Arc;

use apigate_index::ComponentId;

use crate::component::Component;

/// Snapshot access to the components of a baseline.
///
/// `generation` must change whenever a component is added or removed, or a
/// dependency edge changes. The resolver drops its whole cache when it sees
/// a new generation.
pub trait ComponentGraph: Send + Sync {
    fn generation(&self) -> u64;

    fn component(&self, id: &ComponentId) -> Option<Arc<Component>>;

    /// Host of a fragment, if the fragment and its host are both present.
    fn host_of(&self, id: &ComponentId) -> Option<Arc<Component>> {
        let host = self.component(id)?.host.clone()?;
        self.component(&host)
    }
}
