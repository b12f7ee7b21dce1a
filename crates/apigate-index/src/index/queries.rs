//! Query methods for AnnotationIndex.

use super::find::Lookup;
use super::{AnnotationIndex, IndexInner, NodeId};
use crate::annotations::{AccessLevel, Annotations, RestrictionSet, Visibility};
use crate::component_id::ComponentId;
use crate::descriptor::ElementDescriptor;

impl IndexInner {
    pub(crate) fn resolve_annotations(&mut self, element: &ElementDescriptor) -> Option<Annotations> {
        let (id, exact) = match self.find(element, false) {
            Lookup::Exact(id) => (id, true),
            Lookup::Ancestor(id) => (id, false),
            Lookup::Missing => return None,
        };

        let restrictions = if exact {
            self.arena
                .get(id)
                .map_or(RestrictionSet::NO_RESTRICTIONS, |node| node.restrictions)
        } else {
            RestrictionSet::NO_RESTRICTIONS
        };
        Some(Annotations::new(self.resolve_visibility(id), restrictions))
    }

    /// Nearest non-inherited visibility on the parent chain of `id`.
    ///
    /// A chain that is inherited all the way up resolves to `Api`, the
    /// package default.
    pub(crate) fn resolve_visibility(&self, id: NodeId) -> Visibility {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.arena.get(id)) {
            if !node.visibility.is_inherited() {
                return node.visibility;
            }
            current = node.parent;
        }
        Visibility::Api
    }

    pub(crate) fn resolve_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
    ) -> Option<AccessLevel> {
        element
            .path()
            .iter()
            .rev()
            .find_map(|segment| self.access.get(segment)?.get(friend).copied())
    }
}

impl AnnotationIndex {
    /// Resolve the effective annotations of `element`.
    ///
    /// Visibility is inherited from the nearest annotated ancestor;
    /// restrictions are only reported for an explicit node of `element`.
    pub fn resolve_annotations(&self, element: &ElementDescriptor) -> Option<Annotations> {
        self.inner.lock().resolve_annotations(element)
    }

    pub fn resolve_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
    ) -> Option<AccessLevel> {
        self.inner.lock().resolve_access_level(friend, element)
    }

    /// Friends recorded on exactly `element`, ordered by id.
    pub fn friends_of(&self, element: &ElementDescriptor) -> Vec<(ComponentId, AccessLevel)> {
        self.inner
            .lock()
            .access
            .get(element)
            .map(|levels| levels.iter().map(|(id, level)| (id.clone(), *level)).collect())
            .unwrap_or_default()
    }
}
