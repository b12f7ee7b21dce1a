//! Traits shared by every kind of API description.

use crate::annotations::{AccessLevel, Annotations, RestrictionSet, Visibility};
use crate::component_id::ComponentId;
use crate::descriptor::ElementDescriptor;
use crate::Result;

/// Read/write view over the annotations of one component (or of a host and
/// its fragments).
///
/// Implementations use interior locking, so every method takes `&self` and a
/// description can be shared behind an `Arc`.
pub trait ApiDescription: Send + Sync {
    /// Resolved annotations of `element`.
    ///
    /// Returns `None` when not even the element's package is known. Visibility
    /// is resolved through ancestors and is never [`Visibility::Inherited`];
    /// restrictions come only from an explicit node for `element` itself.
    fn resolve_annotations(&self, element: &ElementDescriptor) -> Option<Annotations>;

    fn set_visibility(&self, element: &ElementDescriptor, visibility: Visibility) -> Result<()>;

    fn set_restrictions(
        &self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()>;

    /// Records the access `friend` has to `element` (usually a package).
    fn set_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()>;

    /// Access recorded for `friend` on `element` or its nearest ancestor.
    fn resolve_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
    ) -> Option<AccessLevel>;

    /// Detaches the node for `element` and its subtree. Returns whether an
    /// exact node existed.
    fn remove_element(&self, element: &ElementDescriptor) -> bool;

    /// Pre-order traversal sorted by qualified name at every level.
    fn accept(&self, visitor: &mut dyn DescriptionVisitor);
}

/// Callback interface for [`ApiDescription::accept`].
///
/// Visitors match on [`ElementDescriptor::kind`] instead of receiving one
/// callback per element kind.
pub trait DescriptionVisitor {
    /// Called before the children of `element`. Returning `false` skips them.
    fn visit_element(&mut self, _element: &ElementDescriptor, _annotations: &Annotations) -> bool {
        true
    }

    /// Called after the children of `element` (or after skipping them).
    fn end_visit_element(&mut self, _element: &ElementDescriptor, _annotations: &Annotations) {}
}

/// Write-only target used to seed or re-derive annotations.
///
/// Element sources receive a sink during refresh; writes made through it land
/// in the index being refreshed without re-acquiring its lock.
pub trait AnnotationSink {
    fn set_visibility(&mut self, element: &ElementDescriptor, visibility: Visibility) -> Result<()>;

    fn set_restrictions(
        &mut self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()>;

    fn set_access_level(
        &mut self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()>;
}
