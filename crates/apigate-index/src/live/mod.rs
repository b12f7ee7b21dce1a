//! Change-driven refresh for indices backed by a live declaration source.
//!
//! A live index keeps a [`Fingerprint`] per package and top-level type node.
//! Whenever such a node is reached by a lookup or a traversal, the current
//! fingerprint of its declaration is compared with the stored one; a changed
//! declaration is re-derived through the [`ElementSource`], a vanished one is
//! detached from the tree.
//!
//! Package nodes are additionally reconciled against the fingerprint of the
//! component manifest: when it changes every package is reset to `Private`
//! and the exported packages are derived again.

mod memory;
mod refresh;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::description::AnnotationSink;
use crate::descriptor::ElementDescriptor;

pub use memory::InMemorySource;
pub(crate) use refresh::Refreshed;

/// Opaque, comparable change stamp of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Reference to the declaration backing a node (a source file, a class file,
/// a manifest). Interpreted only by the source and fingerprint provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationHandle(Arc<str>);

impl DeclarationHandle {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeclarationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source could not produce annotations for a declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("source unavailable for {element}: {reason}")]
pub struct SourceUnavailable {
    pub element: String,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(element: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            element: element.to_string(),
            reason: reason.into(),
        }
    }
}

/// Refresh state of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshState {
    /// Derived from the declaration with the stored fingerprint.
    Clean,
    /// Re-derivation in progress; nested refreshes return the node as-is.
    Refreshing,
    /// Never derived, or the last derivation failed.
    Stale,
}

/// Authoritative declarations of one component.
///
/// Derivation callbacks must write through the provided sink. The index is
/// locked while they run, so calling the index directly would deadlock.
pub trait ElementSource: Send + Sync {
    /// Handle of the manifest that declares exported packages.
    fn manifest(&self) -> Option<DeclarationHandle>;

    /// Handle of the declaration of a package or top-level type, if it exists.
    fn locate(&self, element: &ElementDescriptor) -> Option<DeclarationHandle>;

    /// Names of the packages declared by the component.
    fn local_packages(&self) -> Vec<String>;

    /// Top-level types declared in `package`.
    fn declared_types(&self, package: &str) -> Vec<ElementDescriptor>;

    /// Apply manifest-level package annotations (exports, friends).
    fn derive_package_annotations(
        &self,
        sink: &mut dyn AnnotationSink,
    ) -> Result<(), SourceUnavailable>;

    /// Apply annotations of `element` and its members from its declaration.
    fn derive_annotations(
        &self,
        element: &ElementDescriptor,
        handle: &DeclarationHandle,
        sink: &mut dyn AnnotationSink,
    ) -> Result<(), SourceUnavailable>;
}

/// Supplies current fingerprints of declarations.
pub trait FingerprintProvider: Send + Sync {
    /// `None` when the declaration no longer exists.
    fn fingerprint_of(&self, handle: &DeclarationHandle) -> Option<Fingerprint>;
}

/// Per-node refresh bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct LiveNode {
    pub handle: DeclarationHandle,
    pub fingerprint: Option<Fingerprint>,
    pub state: RefreshState,
}

impl LiveNode {
    pub fn new(handle: DeclarationHandle) -> Self {
        Self {
            handle,
            fingerprint: None,
            state: RefreshState::Stale,
        }
    }
}

/// Per-index live source and manifest bookkeeping.
pub(crate) struct LiveBacking {
    pub source: Arc<dyn ElementSource>,
    pub fingerprints: Arc<dyn FingerprintProvider>,
    pub manifest_fingerprint: Option<Fingerprint>,
    pub manifest_synced: bool,
    pub manifest_refreshing: bool,
    /// Every declared package and type has been materialized.
    pub in_sync: bool,
}

impl LiveBacking {
    pub fn new(source: Arc<dyn ElementSource>, fingerprints: Arc<dyn FingerprintProvider>) -> Self {
        Self {
            source,
            fingerprints,
            manifest_fingerprint: None,
            manifest_synced: false,
            manifest_refreshing: false,
            in_sync: false,
        }
    }
}
