//! Arena-backed annotation index.

mod arena;
mod find;
mod mutations;
mod queries;
mod traversal;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::annotations::{AccessLevel, Annotations, RestrictionSet, Visibility};
use crate::component_id::ComponentId;
use crate::description::{AnnotationSink, ApiDescription, DescriptionVisitor};
use crate::descriptor::ElementDescriptor;
use crate::live::{ElementSource, FingerprintProvider, LiveBacking};
use crate::Result;

use arena::NodeArena;
pub(crate) use arena::NodeId;
pub(crate) use find::Lookup;

/// Format version stamped on newly created indices.
pub const CURRENT_FORMAT_VERSION: f32 = 1.2;

/// Hierarchical store of visibility and restriction annotations.
///
/// Handles are cheap to clone and share one tree. All operations on a tree
/// are serialized by its own mutex; separate indices never contend.
///
/// A *static* index (see [`AnnotationIndex::new`]) only holds what was
/// written to it. A *live* index (see [`AnnotationIndex::live`]) is backed by
/// an [`ElementSource`] and re-derives package and type annotations whenever
/// the [`FingerprintProvider`] reports that a declaration changed.
#[derive(Clone)]
pub struct AnnotationIndex {
    pub(crate) inner: Arc<Mutex<IndexInner>>,
}

pub(crate) struct IndexInner {
    pub owner: Option<ComponentId>,
    pub format_version: f32,
    pub arena: NodeArena,
    pub roots: FxHashMap<ElementDescriptor, NodeId>,
    /// Friend access recorded per element, ordered by friend for stable output.
    pub access: FxHashMap<ElementDescriptor, BTreeMap<ComponentId, AccessLevel>>,
    pub modified: bool,
    pub contains_annotated: bool,
    pub live: Option<LiveBacking>,
}

impl IndexInner {
    fn new(owner: Option<ComponentId>, live: Option<LiveBacking>) -> Self {
        Self {
            owner,
            format_version: CURRENT_FORMAT_VERSION,
            arena: NodeArena::default(),
            roots: FxHashMap::default(),
            access: FxHashMap::default(),
            modified: false,
            contains_annotated: false,
            live,
        }
    }
}

impl AnnotationIndex {
    /// Create an empty static index owned by `owner`.
    pub fn new(owner: Option<ComponentId>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(IndexInner::new(owner, None))),
        }
    }

    /// Create a live index that materializes and refreshes nodes from `source`.
    pub fn live(
        owner: Option<ComponentId>,
        source: Arc<dyn ElementSource>,
        fingerprints: Arc<dyn FingerprintProvider>,
    ) -> Self {
        let backing = LiveBacking::new(source, fingerprints);
        Self {
            inner: Arc::new(Mutex::new(IndexInner::new(owner, Some(backing)))),
        }
    }

    /// Override the embedded format version.
    pub fn with_format_version(self, version: f32) -> Self {
        self.inner.lock().format_version = version;
        self
    }

    pub fn owner(&self) -> Option<ComponentId> {
        self.inner.lock().owner.clone()
    }

    pub fn format_version(&self) -> f32 {
        self.inner.lock().format_version
    }

    pub fn is_live(&self) -> bool {
        self.inner.lock().live.is_some()
    }

    /// Whether anything was written (or re-derived) since the last
    /// [`clear_modified`](Self::clear_modified).
    pub fn is_modified(&self) -> bool {
        self.inner.lock().modified
    }

    pub fn clear_modified(&self) {
        self.inner.lock().modified = false;
    }

    /// True once a non-empty restriction set has been written to any node.
    pub fn contains_annotated_elements(&self) -> bool {
        self.inner.lock().contains_annotated
    }

    /// Number of materialized nodes.
    pub fn node_count(&self) -> usize {
        self.inner.lock().arena.len()
    }
}

impl fmt::Debug for AnnotationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AnnotationIndex")
            .field("owner", &inner.owner)
            .field("format_version", &inner.format_version)
            .field("nodes", &inner.arena.len())
            .field("modified", &inner.modified)
            .field("live", &inner.live.is_some())
            .finish()
    }
}

impl ApiDescription for AnnotationIndex {
    fn resolve_annotations(&self, element: &ElementDescriptor) -> Option<Annotations> {
        AnnotationIndex::resolve_annotations(self, element)
    }

    fn set_visibility(&self, element: &ElementDescriptor, visibility: Visibility) -> Result<()> {
        AnnotationIndex::set_visibility(self, element, visibility)
    }

    fn set_restrictions(
        &self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        AnnotationIndex::set_restrictions(self, element, restrictions)
    }

    fn set_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        AnnotationIndex::set_access_level(self, friend, element, level)
    }

    fn resolve_access_level(
        &self,
        friend: &ComponentId,
        element: &ElementDescriptor,
    ) -> Option<AccessLevel> {
        AnnotationIndex::resolve_access_level(self, friend, element)
    }

    fn remove_element(&self, element: &ElementDescriptor) -> bool {
        AnnotationIndex::remove_element(self, element)
    }

    fn accept(&self, visitor: &mut dyn DescriptionVisitor) {
        AnnotationIndex::accept(self, visitor)
    }
}

impl AnnotationSink for AnnotationIndex {
    fn set_visibility(&mut self, element: &ElementDescriptor, visibility: Visibility) -> Result<()> {
        AnnotationIndex::set_visibility(self, element, visibility)
    }

    fn set_restrictions(
        &mut self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        AnnotationIndex::set_restrictions(self, element, restrictions)
    }

    fn set_access_level(
        &mut self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        AnnotationIndex::set_access_level(self, friend, element, level)
    }
}

/// Sink that writes straight into an already locked index.
pub(crate) struct InnerSink<'a> {
    pub inner: &'a mut IndexInner,
}

impl AnnotationSink for InnerSink<'_> {
    fn set_visibility(&mut self, element: &ElementDescriptor, visibility: Visibility) -> Result<()> {
        self.inner.set_visibility(element, visibility)
    }

    fn set_restrictions(
        &mut self,
        element: &ElementDescriptor,
        restrictions: RestrictionSet,
    ) -> Result<()> {
        self.inner.set_restrictions(element, restrictions)
    }

    fn set_access_level(
        &mut self,
        friend: &ComponentId,
        element: &ElementDescriptor,
        level: AccessLevel,
    ) -> Result<()> {
        self.inner.set_access_level(friend, element, level)
    }
}
