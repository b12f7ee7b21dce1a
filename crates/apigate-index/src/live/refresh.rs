use std::mem;

use tracing::{debug, warn};

use super::RefreshState;
use crate::annotations::{RestrictionSet, Visibility};
use crate::descriptor::{ElementDescriptor, ElementKind};
use crate::index::{AnnotationIndex, IndexInner, InnerSink, Lookup, NodeId};

/// Result of refreshing one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refreshed {
    Current(NodeId),
    /// The backing declaration vanished; the node was detached.
    StaleReference,
}

impl IndexInner {
    /// Bring a node up to date with its declaration. Nodes without live
    /// bookkeeping are always current.
    pub(crate) fn refresh(&mut self, id: NodeId) -> Refreshed {
        let kind = match self.arena.get(id) {
            None => return Refreshed::StaleReference,
            Some(node) if node.live.is_none() => return Refreshed::Current(id),
            Some(node) => node.element.kind(),
        };

        match kind {
            ElementKind::Package => self.refresh_package(id),
            _ => self.refresh_type(id),
        }
    }

    /// Re-derive package annotations when the manifest fingerprint moved.
    pub(crate) fn sync_manifest(&mut self) {
        let (source, fingerprints) = match &self.live {
            Some(backing) if !backing.manifest_refreshing => {
                (backing.source.clone(), backing.fingerprints.clone())
            }
            _ => return,
        };

        let current = source
            .manifest()
            .and_then(|handle| fingerprints.fingerprint_of(&handle));
        let unchanged = self
            .live
            .as_ref()
            .is_some_and(|b| b.manifest_synced && b.manifest_fingerprint == current);
        if unchanged {
            return;
        }

        debug!(?current, "manifest changed, re-deriving package annotations");
        if let Some(backing) = self.live.as_mut() {
            backing.manifest_refreshing = true;
        }
        self.modified = true;

        let previous: Vec<(NodeId, Visibility)> = self
            .roots
            .values()
            .filter_map(|id| self.arena.get(*id).map(|node| (*id, node.visibility)))
            .collect();
        for (id, _) in &previous {
            if let Some(node) = self.arena.get_mut(*id) {
                node.visibility = Visibility::Private;
            }
        }

        let result = source.derive_package_annotations(&mut InnerSink { inner: self });
        if let Err(err) = result {
            warn!(error = %err, "package annotations unavailable, keeping previous visibility");
            for (id, visibility) in previous {
                if let Some(node) = self.arena.get_mut(id) {
                    node.visibility = visibility;
                }
            }
        }

        if let Some(backing) = self.live.as_mut() {
            backing.manifest_refreshing = false;
            backing.manifest_synced = true;
            backing.manifest_fingerprint = current;
        }
    }

    fn refresh_package(&mut self, id: NodeId) -> Refreshed {
        self.sync_manifest();

        let Some(handle) = self
            .arena
            .get(id)
            .and_then(|node| node.live.as_ref())
            .map(|live| live.handle.clone())
        else {
            return Refreshed::StaleReference;
        };
        let Some(fingerprints) = self.live.as_ref().map(|b| b.fingerprints.clone()) else {
            return Refreshed::Current(id);
        };

        match fingerprints.fingerprint_of(&handle) {
            Some(current) => {
                if let Some(live) = self.arena.get_mut(id).and_then(|n| n.live.as_mut()) {
                    live.fingerprint = Some(current);
                    live.state = RefreshState::Clean;
                }
                Refreshed::Current(id)
            }
            None => {
                debug!(%handle, "package declaration vanished, detaching");
                self.detach(id);
                Refreshed::StaleReference
            }
        }
    }

    fn refresh_type(&mut self, id: NodeId) -> Refreshed {
        let Some((element, handle, stored, state)) = self.arena.get(id).and_then(|node| {
            let live = node.live.as_ref()?;
            Some((
                node.element.clone(),
                live.handle.clone(),
                live.fingerprint,
                live.state,
            ))
        }) else {
            return Refreshed::StaleReference;
        };

        if state == RefreshState::Refreshing {
            return Refreshed::Current(id);
        }

        let Some((source, fingerprints)) = self
            .live
            .as_ref()
            .map(|b| (b.source.clone(), b.fingerprints.clone()))
        else {
            return Refreshed::Current(id);
        };

        let Some(current) = fingerprints.fingerprint_of(&handle) else {
            debug!(%element, "declaration vanished, detaching");
            self.detach(id);
            return Refreshed::StaleReference;
        };
        if state == RefreshState::Clean && stored == Some(current) {
            return Refreshed::Current(id);
        }

        debug!(%element, ?stored, ?current, "re-deriving annotations");
        self.modified = true;

        let (saved_children, saved_restrictions) = match self.arena.get_mut(id) {
            Some(node) => {
                if let Some(live) = node.live.as_mut() {
                    live.state = RefreshState::Refreshing;
                }
                (
                    mem::take(&mut node.children),
                    mem::replace(&mut node.restrictions, RestrictionSet::NO_RESTRICTIONS),
                )
            }
            None => return Refreshed::StaleReference,
        };

        let result = source.derive_annotations(&element, &handle, &mut InnerSink { inner: self });

        let Some(node) = self.arena.get_mut(id) else {
            // the enclosing package vanished while deriving
            for child in saved_children.into_values() {
                self.arena.release_subtree(child);
            }
            return Refreshed::StaleReference;
        };

        match result {
            Ok(()) => {
                if let Some(live) = node.live.as_mut() {
                    live.fingerprint = Some(current);
                    live.state = RefreshState::Clean;
                }
                for child in saved_children.into_values() {
                    self.arena.release_subtree(child);
                }
            }
            Err(err) => {
                warn!(%element, error = %err, "re-derivation failed, keeping previous annotations");
                let derived = mem::replace(&mut node.children, saved_children);
                node.restrictions = saved_restrictions;
                if let Some(live) = node.live.as_mut() {
                    live.state = RefreshState::Stale;
                }
                for child in derived.into_values() {
                    self.arena.release_subtree(child);
                }
            }
        }
        Refreshed::Current(id)
    }

    fn refresh_state(&mut self, element: &ElementDescriptor) -> Option<RefreshState> {
        match self.find(element, false) {
            Lookup::Exact(id) => Some(
                self.arena
                    .get(id)?
                    .live
                    .as_ref()
                    .map_or(RefreshState::Clean, |live| live.state),
            ),
            Lookup::Ancestor(_) | Lookup::Missing => None,
        }
    }
}

impl AnnotationIndex {
    /// Refresh every node on the path of `element` and report the state of
    /// its own node. `None` when the element has no node.
    ///
    /// Nodes without live bookkeeping always report [`RefreshState::Clean`].
    pub fn refresh(&self, element: &ElementDescriptor) -> Option<RefreshState> {
        self.inner.lock().refresh_state(element)
    }

    /// The set of declarations changed; the next traversal re-synchronizes
    /// packages and types with the source.
    pub fn project_changed(&self) {
        if let Some(backing) = self.inner.lock().live.as_mut() {
            backing.in_sync = false;
        }
    }

    /// Drop every node and forget the manifest fingerprint.
    pub fn clean(&self) {
        let mut inner = self.inner.lock();
        inner.arena.clear();
        inner.roots.clear();
        inner.access.clear();
        inner.contains_annotated = false;
        inner.modified = true;
        if let Some(backing) = inner.live.as_mut() {
            backing.manifest_fingerprint = None;
            backing.manifest_synced = false;
            backing.in_sync = false;
        }
    }
}
