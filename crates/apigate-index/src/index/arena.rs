//! Node storage for [`AnnotationIndex`](super::AnnotationIndex).
//!
//! Nodes live in a slot vector and refer to each other by [`NodeId`]. Parents
//! are ids, not references, so the tree has no ownership cycles and an
//! ancestor walk is a chain of O(1) slot reads.

use rustc_hash::FxHashMap;

use crate::annotations::{RestrictionSet, Visibility};
use crate::descriptor::ElementDescriptor;
use crate::live::LiveNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

#[derive(Debug)]
pub(crate) struct Node {
    pub element: ElementDescriptor,
    pub visibility: Visibility,
    pub restrictions: RestrictionSet,
    pub parent: Option<NodeId>,
    pub children: FxHashMap<ElementDescriptor, NodeId>,
    /// Present only on nodes backed by a live source.
    pub live: Option<LiveNode>,
}

impl Node {
    pub fn new(
        element: ElementDescriptor,
        visibility: Visibility,
        parent: Option<NodeId>,
        live: Option<LiveNode>,
    ) -> Self {
        Self {
            element,
            visibility,
            restrictions: RestrictionSet::NO_RESTRICTIONS,
            parent,
            children: FxHashMap::default(),
            live,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
    len: usize,
}

impl NodeArena {
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.len += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.0 as usize] = Some(node);
            return id;
        }
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Frees `id` and all of its descendants. Does not unlink `id` from its
    /// parent's children.
    pub fn release_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.slots.get_mut(current.0 as usize).and_then(Option::take) else {
                continue;
            };
            stack.extend(node.children.into_values());
            self.free.push(current);
            self.len -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, parent: Option<NodeId>) -> Node {
        Node::new(ElementDescriptor::package(name), Visibility::Api, parent, None)
    }

    #[test]
    fn release_subtree_frees_descendants() {
        let mut arena = NodeArena::default();
        let root = arena.alloc(node("a", None));
        let child = arena.alloc(node("a.b", Some(root)));
        let grandchild = arena.alloc(node("a.b.c", Some(child)));
        if let Some(n) = arena.get_mut(root) {
            n.children.insert(ElementDescriptor::package("a.b"), child);
        }
        if let Some(n) = arena.get_mut(child) {
            n.children.insert(ElementDescriptor::package("a.b.c"), grandchild);
        }

        arena.release_subtree(root);
        assert_eq!(arena.len(), 0);
        assert!(arena.get(grandchild).is_none());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = NodeArena::default();
        let first = arena.alloc(node("a", None));
        arena.release_subtree(first);
        let second = arena.alloc(node("b", None));
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
    }
}
