//! Path walking and lazy node materialization.

use tracing::trace;

use super::arena::{Node, NodeId};
use super::IndexInner;
use crate::annotations::Visibility;
use crate::descriptor::{ElementDescriptor, ElementKind};
use crate::live::{LiveNode, Refreshed};

/// Outcome of walking a descriptor's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// A node for the requested element itself.
    Exact(NodeId),
    /// The deepest existing ancestor; the element inherits from it.
    Ancestor(NodeId),
    /// Not even the package is known.
    Missing,
}

impl IndexInner {
    /// Walk `element.path()` from the roots.
    ///
    /// Absent segments are created when `insert` is set or when the index
    /// always materializes that kind on lookup. Every visited node is
    /// refreshed first, so a live index never hands out a stale node.
    pub(crate) fn find(&mut self, element: &ElementDescriptor, insert: bool) -> Lookup {
        let mut current: Option<NodeId> = None;

        for segment in element.path() {
            let existing = match current {
                None => self.roots.get(&segment).copied(),
                Some(id) => self
                    .arena
                    .get(id)
                    .and_then(|node| node.children.get(&segment).copied()),
            };

            let next = match existing {
                Some(id) => Some(id),
                None if insert || self.inserts_on_resolve(&segment) => {
                    self.create_node(current, &segment)
                }
                None => None,
            };

            let Some(next) = next else { break };
            match self.refresh(next) {
                Refreshed::Current(id) => current = Some(id),
                Refreshed::StaleReference => break,
            }
        }

        match current {
            None => Lookup::Missing,
            Some(id) => match self.arena.get(id) {
                Some(node) if node.element == *element => Lookup::Exact(id),
                Some(_) => Lookup::Ancestor(id),
                None => Lookup::Missing,
            },
        }
    }

    /// Live indices materialize packages and top-level types on lookup;
    /// nested types and members never are.
    fn inserts_on_resolve(&self, segment: &ElementDescriptor) -> bool {
        if self.live.is_none() {
            return false;
        }
        match segment.kind() {
            ElementKind::Package => true,
            ElementKind::Type => segment.enclosing_type().is_none(),
            ElementKind::Method | ElementKind::Field => false,
        }
    }

    /// Create and link a default node for `segment` under `parent`.
    ///
    /// Returns `None` when the node cannot exist: the segment is malformed,
    /// or a live source cannot locate a package or top-level type.
    pub(crate) fn create_node(
        &mut self,
        parent: Option<NodeId>,
        segment: &ElementDescriptor,
    ) -> Option<NodeId> {
        if !segment.is_well_formed() {
            return None;
        }

        let (visibility, live) = match &self.live {
            None => {
                let visibility = match segment.kind() {
                    ElementKind::Package => Visibility::Api,
                    _ => Visibility::Inherited,
                };
                (visibility, None)
            }
            Some(backing) => match segment.kind() {
                // not exported until the manifest says so
                ElementKind::Package => {
                    let handle = backing.source.locate(segment)?;
                    (Visibility::Private, Some(LiveNode::new(handle)))
                }
                ElementKind::Type if segment.enclosing_type().is_none() => {
                    let handle = backing.source.locate(segment)?;
                    (Visibility::Inherited, Some(LiveNode::new(handle)))
                }
                _ => (Visibility::Inherited, None),
            },
        };

        let id = self
            .arena
            .alloc(Node::new(segment.clone(), visibility, parent, live));
        match parent {
            None => {
                self.roots.insert(segment.clone(), id);
            }
            Some(parent_id) => {
                if let Some(parent_node) = self.arena.get_mut(parent_id) {
                    parent_node.children.insert(segment.clone(), id);
                }
            }
        }
        self.modified = true;
        trace!(element = %segment, %visibility, "created annotation node");
        Some(id)
    }

    /// Unlink `id` from its parent (or the roots) and free its subtree.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let element = node.element.clone();
        match node.parent {
            None => {
                self.roots.remove(&element);
            }
            Some(parent_id) => {
                if let Some(parent_node) = self.arena.get_mut(parent_id) {
                    parent_node.children.remove(&element);
                }
            }
        }
        self.access.retain(|key, _| !key.path().contains(&element));
        self.arena.release_subtree(id);
        self.modified = true;
    }
}
