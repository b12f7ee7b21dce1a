//! Explicit registry of components, their API descriptions and the package
//! resolver.
//!
//! One `Baseline` is built at startup and handed to whatever needs it;
//! dropping it (or calling [`Baseline::dispose`]) releases every description.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use apigate_index::{
    AnnotationIndex, ApiDescription, ComponentId, CompositeIndex, ElementSource,
    FingerprintProvider, CURRENT_FORMAT_VERSION,
};

use crate::component::{Component, ExportedPackage};
use crate::graph::ComponentGraph;
use crate::resolver::{PackageResolver, Providers, ResolverOptions};
use crate::seed::annotate_component;
use crate::state::ComponentState;
use crate::{ResolveError, Result};

#[derive(Clone)]
struct LiveBinding {
    source: Arc<dyn ElementSource>,
    fingerprints: Arc<dyn FingerprintProvider>,
}

pub struct Baseline {
    state: ComponentState,
    resolver: PackageResolver,
    /// Per-component index, without fragments.
    indices: DashMap<ComponentId, AnnotationIndex>,
    /// What callers see: the own index, or a composite for hosts with fragments.
    descriptions: DashMap<ComponentId, Arc<dyn ApiDescription>>,
    live: DashMap<ComponentId, LiveBinding>,
    format_version: f32,
}

impl Baseline {
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_state(ComponentState::new(), options)
    }

    /// Build a registry over an existing component state.
    pub fn with_state(state: ComponentState, options: ResolverOptions) -> Self {
        let graph: Arc<dyn ComponentGraph> = Arc::new(state.clone());
        Self {
            resolver: PackageResolver::new(graph, options),
            state,
            indices: DashMap::new(),
            descriptions: DashMap::new(),
            live: DashMap::new(),
            format_version: CURRENT_FORMAT_VERSION,
        }
    }

    /// Format version stamped on descriptions created from now on.
    pub fn with_format_version(mut self, version: f32) -> Self {
        self.format_version = version;
        self
    }

    pub fn state(&self) -> &ComponentState {
        &self.state
    }

    pub fn resolver(&self) -> &PackageResolver {
        &self.resolver
    }

    pub fn component(&self, id: &ComponentId) -> Option<Arc<Component>> {
        self.state.get(id)
    }

    pub fn components(&self) -> Vec<Arc<Component>> {
        self.state.components()
    }

    pub fn add_component(&self, component: Component) -> Result<()> {
        self.add_components(std::iter::once(component))
    }

    /// Register components. Hosts of newly added fragments lose their cached
    /// description so the next request includes the fragment; fragments of
    /// newly added hosts are re-seeded from the host's exports.
    pub fn add_components<I>(&self, components: I) -> Result<()>
    where
        I: IntoIterator<Item = Component>,
    {
        let components: Vec<Component> = components.into_iter().collect();
        let hosts: Vec<ComponentId> = components.iter().filter_map(|c| c.host.clone()).collect();
        let added: Vec<ComponentId> = components.iter().map(|c| c.id.clone()).collect();
        self.state.add_components(components)?;
        for host in &hosts {
            self.invalidate(host);
        }
        for id in &added {
            self.invalidate_fragments(id);
        }
        Ok(())
    }

    /// Unregister a component, dropping its description, its host's and
    /// those of its fragments.
    pub fn remove_component(&self, id: &ComponentId) -> Option<Arc<Component>> {
        let removed = self.state.remove_component(id)?;
        self.invalidate(id);
        self.live.remove(id);
        if let Some(host) = &removed.host {
            self.invalidate(host);
        }
        self.invalidate_fragments(id);
        Some(removed)
    }

    /// Replace a component's packages without touching dependency edges.
    ///
    /// Only cached resolutions of the affected package names are dropped.
    pub fn update_packages(
        &self,
        id: &ComponentId,
        packages: Vec<String>,
        exports: Vec<ExportedPackage>,
    ) -> Result<()> {
        let affected = self.state.update_packages(id, packages, exports)?;
        debug!(component = %id, packages = affected.len(), "invalidating package resolutions");
        self.resolver.clear_packages(&affected);

        self.invalidate(id);
        if let Some(host) = self.state.get(id).and_then(|c| c.host.clone()) {
            self.invalidate(&host);
        }
        self.invalidate_fragments(id);
        Ok(())
    }

    pub fn resolve_package(&self, requester: &ComponentId, package: &str) -> Result<Providers> {
        self.resolver.resolve_package(requester, package)
    }

    /// API description of a component, created on first request.
    ///
    /// Hosts with fragments get a [`CompositeIndex`] of the host index
    /// followed by each fragment index.
    pub fn description(&self, id: &ComponentId) -> Result<Arc<dyn ApiDescription>> {
        if let Some(description) = self.descriptions.get(id) {
            return Ok(description.clone());
        }

        let fragments = self.state.fragments_of(id);
        let own = self.index(id)?;
        let description: Arc<dyn ApiDescription> = if fragments.is_empty() {
            Arc::new(own)
        } else {
            let mut parts: Vec<Arc<dyn ApiDescription>> = vec![Arc::new(own)];
            for fragment in &fragments {
                parts.push(Arc::new(self.index(&fragment.id)?));
            }
            Arc::new(CompositeIndex::new(parts))
        };

        Ok(self
            .descriptions
            .entry(id.clone())
            .or_insert(description)
            .clone())
    }

    /// The component's own index, excluding fragments.
    pub fn index(&self, id: &ComponentId) -> Result<AnnotationIndex> {
        if let Some(index) = self.indices.get(id) {
            return Ok(index.clone());
        }

        let component = self
            .state
            .get(id)
            .ok_or_else(|| ResolveError::UnknownComponent(id.clone()))?;

        let index = match self.live.get(id).map(|binding| binding.clone()) {
            Some(binding) => {
                AnnotationIndex::live(Some(id.clone()), binding.source, binding.fingerprints)
                    .with_format_version(self.format_version)
            }
            None => {
                let mut index =
                    AnnotationIndex::new(Some(id.clone())).with_format_version(self.format_version);
                let host = component.host.as_ref().and_then(|h| self.state.get(h));
                let fragments = self.state.fragments_of(id);
                annotate_component(&mut index, &component, host.as_deref(), &fragments);
                index.clear_modified();
                index
            }
        };
        debug!(component = %id, live = index.is_live(), "created API description");

        Ok(self.indices.entry(id.clone()).or_insert(index).clone())
    }

    /// Back a component's description by a live source instead of its
    /// package declarations.
    pub fn attach_live_source(
        &self,
        id: &ComponentId,
        source: Arc<dyn ElementSource>,
        fingerprints: Arc<dyn FingerprintProvider>,
    ) -> Result<()> {
        let component = self
            .state
            .get(id)
            .ok_or_else(|| ResolveError::UnknownComponent(id.clone()))?;
        self.live.insert(
            id.clone(),
            LiveBinding {
                source,
                fingerprints,
            },
        );
        self.invalidate(id);
        if let Some(host) = &component.host {
            self.invalidate(host);
        }
        Ok(())
    }

    /// Revert to a description seeded from package declarations.
    pub fn detach_live_source(&self, id: &ComponentId) -> bool {
        let detached = self.live.remove(id).is_some();
        if detached {
            self.invalidate(id);
            if let Some(host) = self.state.get(id).and_then(|c| c.host.clone()) {
                self.invalidate(&host);
            }
        }
        detached
    }

    /// Release every description and cached resolution.
    pub fn dispose(&self) {
        self.descriptions.clear();
        self.indices.clear();
        self.live.clear();
        self.resolver.clear();
    }

    fn invalidate(&self, id: &ComponentId) {
        self.indices.remove(id);
        self.descriptions.remove(id);
    }

    fn invalidate_fragments(&self, host: &ComponentId) {
        for fragment in self.state.fragments_of(host) {
            self.invalidate(&fragment.id);
        }
    }
}

impl fmt::Debug for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Baseline")
            .field("components", &self.state.len())
            .field("descriptions", &self.descriptions.len())
            .field("live", &self.live.len())
            .field("resolver", &self.resolver)
            .finish()
    }
}
