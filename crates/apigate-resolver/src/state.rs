//! In-memory component graph.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use tracing::debug;

use apigate_index::ComponentId;

use crate::component::{Component, ExportedPackage, RequiredComponent};
use crate::graph::ComponentGraph;
use crate::{ResolveError, Result};

/// Maximum depth for transitive closures over required edges.
///
/// Keeps pathological graphs (long chains, cycles through re-exports) from
/// turning a query into an unbounded walk.
pub const MAX_DEPENDENCY_DEPTH: usize = 50;

#[derive(Debug, Default)]
struct StateInner {
    components: IndexMap<ComponentId, Arc<Component>>,
    generation: u64,
}

/// Mutable set of components with a topology generation counter.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    inner: Arc<RwLock<StateInner>>,
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one component. Bumps the generation.
    pub fn add_component(&self, component: Component) -> Result<()> {
        self.add_components(std::iter::once(component))
    }

    /// Add several components at once; nothing is added if any id is taken.
    pub fn add_components<I>(&self, components: I) -> Result<()>
    where
        I: IntoIterator<Item = Component>,
    {
        let components: Vec<Component> = components.into_iter().collect();
        let mut inner = self.inner.write();

        let mut seen = IndexSet::new();
        for component in &components {
            if inner.components.contains_key(&component.id) || !seen.insert(&component.id) {
                return Err(ResolveError::DuplicateComponent(component.id.clone()));
            }
        }

        for component in components {
            inner
                .components
                .insert(component.id.clone(), Arc::new(component));
        }
        inner.generation += 1;
        debug!(generation = inner.generation, "components added");
        Ok(())
    }

    /// Remove a component. Bumps the generation when it existed.
    pub fn remove_component(&self, id: &ComponentId) -> Option<Arc<Component>> {
        let mut inner = self.inner.write();
        let removed = inner.components.shift_remove(id)?;
        inner.generation += 1;
        debug!(component = %id, generation = inner.generation, "component removed");
        Some(removed)
    }

    /// Replace the local and exported packages of a component.
    ///
    /// Dependency edges are untouched, so the generation is kept. Returns the
    /// package names whose resolution may have changed.
    pub fn update_packages(
        &self,
        id: &ComponentId,
        packages: Vec<String>,
        exports: Vec<ExportedPackage>,
    ) -> Result<Vec<String>> {
        let mut inner = self.inner.write();
        let current = inner
            .components
            .get_mut(id)
            .ok_or_else(|| ResolveError::UnknownComponent(id.clone()))?;

        let mut affected: IndexSet<String> = IndexSet::new();
        affected.extend(current.packages.iter().cloned());
        affected.extend(current.exports.iter().map(|e| e.name.clone()));
        affected.extend(packages.iter().cloned());
        affected.extend(exports.iter().map(|e| e.name.clone()));

        let component = Arc::make_mut(current);
        component.packages = packages;
        component.exports = exports;
        Ok(affected.into_iter().collect())
    }

    pub fn get(&self, id: &ComponentId) -> Option<Arc<Component>> {
        self.inner.read().components.get(id).cloned()
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.inner.read().components.contains_key(id)
    }

    /// All components in insertion order.
    pub fn components(&self) -> Vec<Arc<Component>> {
        self.inner.read().components.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().components.is_empty()
    }

    /// Fragments attached to `host`, in insertion order.
    pub fn fragments_of(&self, host: &ComponentId) -> Vec<Arc<Component>> {
        self.inner
            .read()
            .components
            .values()
            .filter(|c| c.host.as_ref() == Some(host))
            .cloned()
            .collect()
    }

    /// Components `id` depends on, transitively, nearest first.
    ///
    /// A fragment depends on its host. Missing components are skipped.
    pub fn prerequisites(&self, id: &ComponentId) -> Result<Vec<ComponentId>> {
        let inner = self.inner.read();
        if !inner.components.contains_key(id) {
            return Err(ResolveError::UnknownComponent(id.clone()));
        }

        let edges = |current: &ComponentId| -> Vec<ComponentId> {
            let Some(component) = inner.components.get(current) else {
                return Vec::new();
            };
            component
                .host
                .iter()
                .cloned()
                .chain(component.requires.iter().map(|r| r.id.clone()))
                .filter(|dep| inner.components.contains_key(dep))
                .collect()
        };
        Ok(closure(id, edges))
    }

    /// Components that depend on `id`, transitively, nearest first.
    pub fn dependents(&self, id: &ComponentId) -> Result<Vec<ComponentId>> {
        let inner = self.inner.read();
        if !inner.components.contains_key(id) {
            return Err(ResolveError::UnknownComponent(id.clone()));
        }

        let edges = |current: &ComponentId| -> Vec<ComponentId> {
            inner
                .components
                .values()
                .filter(|c| {
                    c.host.as_ref() == Some(current) || c.requires.iter().any(|r| &r.id == current)
                })
                .map(|c| c.id.clone())
                .collect()
        };
        Ok(closure(id, edges))
    }

    /// Mandatory requirements whose target is missing, per requiring component.
    pub fn unresolved_requirements(&self) -> Vec<(ComponentId, RequiredComponent)> {
        let inner = self.inner.read();
        inner
            .components
            .values()
            .flat_map(|c| {
                c.requires
                    .iter()
                    .filter(|r| !r.optional && !inner.components.contains_key(&r.id))
                    .map(|r| (c.id.clone(), r.clone()))
            })
            .collect()
    }

    /// Fragments whose host is not in the graph.
    pub fn orphan_fragments(&self) -> Vec<Arc<Component>> {
        let inner = self.inner.read();
        inner
            .components
            .values()
            .filter(|c| {
                c.host
                    .as_ref()
                    .is_some_and(|host| !inner.components.contains_key(host))
            })
            .cloned()
            .collect()
    }
}

/// Breadth-first closure from `start` (excluded), bounded by
/// [`MAX_DEPENDENCY_DEPTH`].
fn closure<F>(start: &ComponentId, edges: F) -> Vec<ComponentId>
where
    F: Fn(&ComponentId) -> Vec<ComponentId>,
{
    let mut seen: IndexSet<ComponentId> = IndexSet::new();
    seen.insert(start.clone());
    let mut queue = VecDeque::from([(start.clone(), 0usize)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= MAX_DEPENDENCY_DEPTH {
            continue;
        }
        for next in edges(&current) {
            if seen.insert(next.clone()) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    seen.into_iter().skip(1).collect()
}

impl ComponentGraph for ComponentState {
    fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    fn component(&self, id: &ComponentId) -> Option<Arc<Component>> {
        self.get(id)
    }
}
