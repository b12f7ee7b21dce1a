//! Ordered union of several descriptions.
//!
//! A host component and its fragments each own an index; the composite
//! presents them as one description with the host first.

use std::fmt;
use std::sync::Arc;

use crate::annotations::{AccessLevel, Annotations, RestrictionSet, Visibility};
use crate::component_id::ComponentId;
use crate::description::{ApiDescription, DescriptionVisitor};
use crate::descriptor::ElementDescriptor;
use crate::{IndexError, Result};

#[derive(Clone, Default)]
pub struct CompositeIndex {
    parts: Vec<Arc<dyn ApiDescription>>,
}

impl CompositeIndex {
    pub fn new(parts: Vec<Arc<dyn ApiDescription>>) -> Self {
        Self { parts }
    }

    pub fn push(&mut self, part: Arc<dyn ApiDescription>) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[Arc<dyn ApiDescription>] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Run a write against each part in order until one accepts it.
    fn write_first(
        &self,
        element: &ElementDescriptor,
        mut write: impl FnMut(&dyn ApiDescription) -> Result<()>,
    ) -> Result<()> {
        let mut last = None;
        for part in &self.parts {
            match write(part.as_ref()) {
                Ok(()) => return Ok(()),
                Err(err) => last = Some(err),
            }
        }
        Err(last.unwrap_or_else(|| IndexError::element_not_found(element, None)))
    }
}

impl fmt::Debug for CompositeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeIndex")
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl ApiDescription for CompositeIndex {
    /// First part with a result wins; results are never merged.
    fn resolve_annotations(&self, element: &ElementDescriptor) -> Option<Annotations> {
        self.parts
            .iter()
            .find_map(|part| part.resolve_annotations(element))
    }

    fn set_visibility(&self, element: &ElementDescriptor, visibility: Visibility) -> Result<()> {
        self.write_first(element, |part| part.set_visibility(element, visibility))
    }

    fn set_restrictions(
        &self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        self.write_first(element, |part| part.set_restrictions(element, restrictions))
    }

    fn set_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        self.write_first(element, |part| part.set_access_level(friend, element, level))
    }

    fn resolve_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
    ) -> Option<AccessLevel> {
        self.parts
            .iter()
            .find_map(|part| part.resolve_access_level(friend, element))
    }

    fn remove_element(&self, element: &ElementDescriptor) -> bool {
        let mut removed = false;
        for part in &self.parts {
            removed |= part.remove_element(element);
        }
        removed
    }

    /// Delegates to every part in order without deduplication.
    fn accept(&self, visitor: &mut dyn DescriptionVisitor) {
        for part in &self.parts {
            part.accept(visitor);
        }
    }
}
