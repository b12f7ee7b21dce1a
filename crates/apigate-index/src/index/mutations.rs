//! Mutation methods for AnnotationIndex.

use tracing::debug;

use super::find::Lookup;
use super::{AnnotationIndex, IndexInner, NodeId};
use crate::annotations::{AccessLevel, RestrictionSet, Visibility};
use crate::component_id::ComponentId;
use crate::descriptor::ElementDescriptor;
use crate::{IndexError, Result};

impl IndexInner {
    fn node_for_write(&mut self, element: &ElementDescriptor) -> Result<NodeId> {
        match self.find(element, true) {
            Lookup::Exact(id) => Ok(id),
            Lookup::Ancestor(_) | Lookup::Missing => {
                debug!(%element, "write target cannot be materialized");
                Err(IndexError::element_not_found(element, self.owner.as_ref()))
            }
        }
    }

    pub(crate) fn set_visibility(
        &mut self,
        element: &ElementDescriptor,
        visibility: Visibility,
    ) -> Result<()> {
        let id = self.node_for_write(element)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.visibility = visibility;
        }
        self.modified = true;
        Ok(())
    }

    pub(crate) fn set_restrictions(
        &mut self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        let id = self.node_for_write(element)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.restrictions = restrictions;
        }
        if !restrictions.is_empty() {
            self.contains_annotated = true;
        }
        self.modified = true;
        Ok(())
    }

    pub(crate) fn set_access_level(
        &mut self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        self.node_for_write(element)?;
        self.access
            .entry(element.clone())
            .or_default()
            .insert(friend.clone(), level);
        self.modified = true;
        Ok(())
    }

    pub(crate) fn remove_element(&mut self, element: &ElementDescriptor) -> bool {
        match self.find(element, false) {
            Lookup::Exact(id) => {
                self.detach(id);
                true
            }
            Lookup::Ancestor(_) | Lookup::Missing => false,
        }
    }
}

impl AnnotationIndex {
    /// Set the visibility of `element`, materializing its node if needed.
    ///
    /// Fails with [`IndexError::ElementNotFound`] only when the node cannot
    /// exist (malformed descriptor, or a live source that does not declare it).
    pub fn set_visibility(&self, element: &ElementDescriptor, visibility: Visibility) -> Result<()> {
        self.inner.lock().set_visibility(element, visibility)
    }

    /// Set the restrictions of exactly `element`. Descendants are unaffected.
    pub fn set_restrictions(
        &self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        self.inner.lock().set_restrictions(element, restrictions)
    }

    pub fn set_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        self.inner.lock().set_access_level(friend, element, level)
    }

    pub fn remove_element(&self, element: &ElementDescriptor) -> bool {
        self.inner.lock().remove_element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_visibility_marks_modified() {
        let index = AnnotationIndex::new(None);
        assert!(!index.is_modified());
        index
            .set_visibility(&ElementDescriptor::package("a"), Visibility::Spi)
            .unwrap();
        assert!(index.is_modified());
        index.clear_modified();
        assert!(!index.is_modified());
    }

    #[test]
    fn malformed_write_is_element_not_found() {
        let index = AnnotationIndex::new(Some(ComponentId::new("x")));
        let err = index
            .set_visibility(&ElementDescriptor::type_("a", "Outer$"), Visibility::Api)
            .unwrap_err();
        assert!(matches!(err, IndexError::ElementNotFound { ref owner, .. } if owner == "x"));
    }

    #[test]
    fn empty_restrictions_do_not_flag_annotated() {
        let index = AnnotationIndex::new(None);
        let ty = ElementDescriptor::type_("a", "T");
        index
            .set_restrictions(&ty, RestrictionSet::NO_RESTRICTIONS)
            .unwrap();
        assert!(!index.contains_annotated_elements());
        index.set_restrictions(&ty, RestrictionSet::NO_EXTEND).unwrap();
        assert!(index.contains_annotated_elements());
    }

    #[test]
    fn remove_element_detaches_subtree() {
        let index = AnnotationIndex::new(None);
        let ty = ElementDescriptor::type_("a", "T");
        let field = ty.field("f");
        index.set_restrictions(&field, RestrictionSet::NO_REFERENCE).unwrap();
        assert_eq!(index.node_count(), 3);

        assert!(index.remove_element(&ty));
        assert_eq!(index.node_count(), 1);
        assert!(!index.remove_element(&ty));
    }
}
