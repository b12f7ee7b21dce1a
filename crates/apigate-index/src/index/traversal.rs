//! Ordered traversal for AnnotationIndex.
//!
//! The tree is copied into a snapshot while the lock is held and the visitor
//! runs afterwards, so a visitor may call back into the index.

use tracing::debug;

use super::{AnnotationIndex, IndexInner, NodeId};
use crate::annotations::{Annotations, Visibility};
use crate::description::DescriptionVisitor;
use crate::descriptor::ElementDescriptor;
use crate::live::Refreshed;

struct SnapshotNode {
    element: ElementDescriptor,
    annotations: Annotations,
    children: Vec<SnapshotNode>,
}

impl IndexInner {
    /// Materialize every package and top-level type the live source declares.
    fn synchronize_with_source(&mut self) {
        let source = match &self.live {
            Some(backing) if !backing.in_sync => backing.source.clone(),
            _ => return,
        };

        let packages = source.local_packages();
        debug!(packages = packages.len(), "synchronizing live index with its source");
        for package in &packages {
            self.find(&ElementDescriptor::package(package), false);
            for ty in source.declared_types(package) {
                self.find(&ty, false);
            }
        }

        if let Some(backing) = self.live.as_mut() {
            backing.in_sync = true;
        }
    }

    fn snapshot(&mut self) -> Vec<SnapshotNode> {
        self.synchronize_with_source();
        self.sync_manifest();

        let mut roots: Vec<(ElementDescriptor, NodeId)> =
            self.roots.iter().map(|(el, id)| (el.clone(), *id)).collect();
        roots.sort_by(|a, b| a.0.cmp(&b.0));

        roots
            .into_iter()
            .filter_map(|(_, id)| self.snapshot_node(id, Visibility::Api))
            .collect()
    }

    fn snapshot_node(&mut self, id: NodeId, inherited: Visibility) -> Option<SnapshotNode> {
        let id = match self.refresh(id) {
            Refreshed::Current(id) => id,
            Refreshed::StaleReference => return None,
        };
        let node = self.arena.get(id)?;

        let visibility = if node.visibility.is_inherited() {
            inherited
        } else {
            node.visibility
        };
        let element = node.element.clone();
        let annotations = Annotations::new(visibility, node.restrictions);

        let mut child_ids: Vec<(ElementDescriptor, NodeId)> = node
            .children
            .iter()
            .map(|(el, id)| (el.clone(), *id))
            .collect();
        child_ids.sort_by(|a, b| a.0.cmp(&b.0));

        let children = child_ids
            .into_iter()
            .filter_map(|(_, child)| self.snapshot_node(child, visibility))
            .collect();

        Some(SnapshotNode {
            element,
            annotations,
            children,
        })
    }
}

fn walk(node: &SnapshotNode, visitor: &mut dyn DescriptionVisitor) {
    if visitor.visit_element(&node.element, &node.annotations) {
        for child in &node.children {
            walk(child, visitor);
        }
    }
    visitor.end_visit_element(&node.element, &node.annotations);
}

impl AnnotationIndex {
    /// Visit every node in pre-order, sorted by qualified name at each level.
    ///
    /// Visited annotations carry resolved visibility. A live index first
    /// materializes everything its source declares.
    pub fn accept(&self, visitor: &mut dyn DescriptionVisitor) {
        let snapshot = self.inner.lock().snapshot();
        for root in &snapshot {
            walk(root, visitor);
        }
    }

    /// Every node as `(element, annotations)` in traversal order.
    pub fn elements(&self) -> Vec<(ElementDescriptor, Annotations)> {
        struct Collect(Vec<(ElementDescriptor, Annotations)>);

        impl DescriptionVisitor for Collect {
            fn visit_element(&mut self, element: &ElementDescriptor, annotations: &Annotations) -> bool {
                self.0.push((element.clone(), *annotations));
                true
            }
        }

        let mut collect = Collect(Vec::new());
        self.accept(&mut collect);
        collect.0
    }
}
