//! In-memory declaration source.
//!
//! Every edit bumps a stamp, which doubles as the declaration's fingerprint.
//! Used to drive live indices without a file system or a parser.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::{DeclarationHandle, ElementSource, Fingerprint, FingerprintProvider, SourceUnavailable};
use crate::annotations::{Annotations, Visibility};
use crate::description::AnnotationSink;
use crate::descriptor::{ElementDescriptor, ElementKind};

const MANIFEST_HANDLE: &str = "manifest";

#[derive(Debug, Default)]
struct TypeDecl {
    stamp: u64,
    /// Annotations for the type itself and its members.
    annotations: Vec<(ElementDescriptor, Annotations)>,
}

#[derive(Debug, Default)]
struct State {
    next_stamp: u64,
    manifest_stamp: u64,
    /// package name → declaration stamp
    packages: BTreeMap<String, u64>,
    /// package name → visibility applied at manifest derivation
    exports: BTreeMap<String, Visibility>,
    types: BTreeMap<ElementDescriptor, TypeDecl>,
    failing: FxHashSet<ElementDescriptor>,
    manifest_failing: bool,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }
}

/// Declarations held in memory; implements both [`ElementSource`] and
/// [`FingerprintProvider`].
#[derive(Debug, Default)]
pub struct InMemorySource {
    state: RwLock<State>,
    derivations: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or touch) a local package.
    pub fn declare_package(&self, name: &str) {
        let mut state = self.state.write();
        let stamp = state.bump();
        state.packages.insert(name.to_string(), stamp);
    }

    /// Remove a package and every type declared in it.
    pub fn remove_package(&self, name: &str) {
        let mut state = self.state.write();
        state.packages.remove(name);
        state.exports.remove(name);
        state.types.retain(|ty, _| ty.package_name() != name);
        state.manifest_stamp = state.bump();
    }

    /// Export `package` from the manifest with the given visibility.
    pub fn export_package(&self, package: &str, visibility: Visibility) {
        let mut state = self.state.write();
        state.exports.insert(package.to_string(), visibility);
        state.manifest_stamp = state.bump();
    }

    pub fn unexport_package(&self, package: &str) {
        let mut state = self.state.write();
        state.exports.remove(package);
        state.manifest_stamp = state.bump();
    }

    /// Declare (or redeclare) a top-level type with the annotations its
    /// declaration carries. The package is declared if needed.
    pub fn declare_type(
        &self,
        ty: &ElementDescriptor,
        annotations: Vec<(ElementDescriptor, Annotations)>,
    ) {
        let mut state = self.state.write();
        if !state.packages.contains_key(ty.package_name()) {
            let stamp = state.bump();
            state.packages.insert(ty.package_name().to_string(), stamp);
        }
        let stamp = state.bump();
        state.types.insert(ty.clone(), TypeDecl { stamp, annotations });
    }

    pub fn remove_type(&self, ty: &ElementDescriptor) {
        self.state.write().types.remove(ty);
    }

    /// Make derivation of `element` fail until reset.
    pub fn set_failing(&self, element: &ElementDescriptor, failing: bool) {
        let mut state = self.state.write();
        if failing {
            state.failing.insert(element.clone());
        } else {
            state.failing.remove(element);
        }
        // force a re-derivation attempt
        let stamp = state.bump();
        if let Some(decl) = state.types.get_mut(element) {
            decl.stamp = stamp;
        }
    }

    pub fn set_manifest_failing(&self, failing: bool) {
        let mut state = self.state.write();
        state.manifest_failing = failing;
        state.manifest_stamp = state.bump();
    }

    /// Number of successful or failed derivations so far.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }

    fn type_handle(ty: &ElementDescriptor) -> DeclarationHandle {
        DeclarationHandle::new(format!("type:{}", ty.qualified_name()))
    }

    fn package_handle(name: &str) -> DeclarationHandle {
        DeclarationHandle::new(format!("package:{name}"))
    }
}

impl ElementSource for InMemorySource {
    fn manifest(&self) -> Option<DeclarationHandle> {
        Some(DeclarationHandle::new(MANIFEST_HANDLE))
    }

    fn locate(&self, element: &ElementDescriptor) -> Option<DeclarationHandle> {
        let state = self.state.read();
        match element.kind() {
            ElementKind::Package => state
                .packages
                .contains_key(element.package_name())
                .then(|| Self::package_handle(element.package_name())),
            ElementKind::Type => state
                .types
                .contains_key(element)
                .then(|| Self::type_handle(element)),
            ElementKind::Method | ElementKind::Field => None,
        }
    }

    fn local_packages(&self) -> Vec<String> {
        self.state.read().packages.keys().cloned().collect()
    }

    fn declared_types(&self, package: &str) -> Vec<ElementDescriptor> {
        self.state
            .read()
            .types
            .keys()
            .filter(|ty| ty.package_name() == package)
            .cloned()
            .collect()
    }

    fn derive_package_annotations(
        &self,
        sink: &mut dyn AnnotationSink,
    ) -> Result<(), SourceUnavailable> {
        self.derivations.fetch_add(1, Ordering::Relaxed);
        let exports: Vec<(String, Visibility)> = {
            let state = self.state.read();
            if state.manifest_failing {
                return Err(SourceUnavailable::new(MANIFEST_HANDLE, "manifest unreadable"));
            }
            state
                .exports
                .iter()
                .map(|(name, visibility)| (name.clone(), *visibility))
                .collect()
        };
        for (name, visibility) in exports {
            if let Err(err) = sink.set_visibility(&ElementDescriptor::package(&name), visibility) {
                debug!(package = %name, error = %err, "skipping export of undeclared package");
            }
        }
        Ok(())
    }

    fn derive_annotations(
        &self,
        element: &ElementDescriptor,
        _handle: &DeclarationHandle,
        sink: &mut dyn AnnotationSink,
    ) -> Result<(), SourceUnavailable> {
        self.derivations.fetch_add(1, Ordering::Relaxed);
        let annotations = {
            let state = self.state.read();
            if state.failing.contains(element) {
                return Err(SourceUnavailable::new(element, "declaration could not be parsed"));
            }
            match state.types.get(element) {
                Some(decl) => decl.annotations.clone(),
                None => return Err(SourceUnavailable::new(element, "declaration not found")),
            }
        };
        for (target, annotations) in annotations {
            sink.set_visibility(&target, annotations.visibility)
                .and_then(|()| sink.set_restrictions(&target, annotations.restrictions))
                .map_err(|err| SourceUnavailable::new(&target, err.to_string()))?;
        }
        Ok(())
    }
}

impl FingerprintProvider for InMemorySource {
    fn fingerprint_of(&self, handle: &DeclarationHandle) -> Option<Fingerprint> {
        let state = self.state.read();
        let text = handle.as_str();
        if text == MANIFEST_HANDLE {
            return Some(Fingerprint::new(state.manifest_stamp));
        }
        if let Some(name) = text.strip_prefix("package:") {
            return state.packages.get(name).copied().map(Fingerprint::new);
        }
        let qualified = text.strip_prefix("type:")?;
        let ty = ElementDescriptor::qualified_type(qualified);
        state.types.get(&ty).map(|decl| Fingerprint::new(decl.stamp))
    }
}
