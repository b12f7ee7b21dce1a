//! Memoized package-origin resolution.
//!
//! `resolve_package(R, P)` answers which components make package `P`
//! visible to component `R`. Answers are cached per `(P, R)`; the whole cache
//! is dropped when the graph generation moves, and single packages can be
//! dropped when only a component's package set changed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use apigate_index::ComponentId;

use crate::component::Component;
use crate::graph::ComponentGraph;
use crate::state::MAX_DEPENDENCY_DEPTH;
use crate::{ResolveError, Result};

/// Ordered, distinct components supplying a package.
pub type Providers = Arc<[ComponentId]>;

/// Tuning of package resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Packages starting with one of these prefixes come from the system library.
    pub system_package_prefixes: Vec<String>,
    /// Additional packages exported by the platform.
    pub system_packages: Vec<String>,
    /// Component standing in for the platform; system packages resolve to
    /// nothing when unset.
    pub system_library: Option<ComponentId>,
    /// Maximum number of re-export hops followed from a direct dependency.
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            system_package_prefixes: vec!["java.".to_string()],
            system_packages: Vec::new(),
            system_library: None,
            max_depth: MAX_DEPENDENCY_DEPTH,
        }
    }
}

/// Cache counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of cached package names.
    pub packages: usize,
    /// Number of cached `(package, requester)` answers.
    pub entries: usize,
}

pub struct PackageResolver {
    graph: Arc<dyn ComponentGraph>,
    options: ResolverOptions,
    cache: DashMap<String, FxHashMap<ComponentId, Providers>>,
    /// Graph generation the cache content belongs to.
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PackageResolver {
    pub fn new(graph: Arc<dyn ComponentGraph>, options: ResolverOptions) -> Self {
        let generation = graph.generation();
        Self {
            graph,
            options,
            cache: DashMap::new(),
            generation: AtomicU64::new(generation),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Components that make `package` visible to `requester`, in discovery
    /// order: the requester itself, its host (for fragments), then exporters
    /// reached through required components and their re-exports.
    ///
    /// An unknown requester is an error; a package nobody supplies is an
    /// empty result.
    pub fn resolve_package(&self, requester: &ComponentId, package: &str) -> Result<Providers> {
        let generation = self.sync_generation();

        if let Some(cached) = self
            .cache
            .get(package)
            .and_then(|entry| entry.get(requester).cloned())
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(%package, %requester, "package resolution cache hit");
            return Ok(cached);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let component = self
            .graph
            .component(requester)
            .ok_or_else(|| ResolveError::UnknownComponent(requester.clone()))?;

        let providers: Providers = if self.is_system_package(package) {
            self.options.system_library.iter().cloned().collect()
        } else {
            self.collect_providers(&component, package).into_iter().collect()
        };
        debug!(
            %package,
            %requester,
            providers = providers.len(),
            "resolved package"
        );

        self.remember(package, requester, &providers, generation);
        Ok(providers)
    }

    /// Cache an answer computed against `generation`. The entry is withdrawn
    /// again when the graph moved before or while it was inserted.
    fn remember(&self, package: &str, requester: &ComponentId, providers: &Providers, generation: u64) {
        if self.graph.generation() != generation {
            return;
        }
        self.cache
            .entry(package.to_string())
            .or_default()
            .insert(requester.clone(), providers.clone());
        if self.graph.generation() != generation {
            trace!(%package, %requester, "component graph moved during insert, dropping answer");
            if let Some(mut entry) = self.cache.get_mut(package) {
                entry.remove(requester);
            }
        }
        self.sync_generation();
    }

    fn is_system_package(&self, package: &str) -> bool {
        self.options
            .system_package_prefixes
            .iter()
            .any(|prefix| package.starts_with(prefix.as_str()))
            || self.options.system_packages.iter().any(|p| p == package)
    }

    fn collect_providers(&self, requester: &Component, package: &str) -> IndexSet<ComponentId> {
        let mut found = IndexSet::new();
        let host = requester
            .host
            .as_ref()
            .and_then(|host| self.graph.component(host));

        let holds_locally = |c: &Component| c.declares_package(package) || c.export(package).is_some();
        if holds_locally(requester) {
            found.insert(requester.id.clone());
        }
        if let Some(host) = host.as_deref().filter(|h| holds_locally(h)) {
            found.insert(host.id.clone());
        }

        let mut visited: FxHashSet<ComponentId> = FxHashSet::default();
        visited.insert(requester.id.clone());
        let mut queue = VecDeque::new();
        let direct = requester
            .requires
            .iter()
            .chain(host.iter().flat_map(|h| h.requires.iter()));
        if let Some(host) = &host {
            visited.insert(host.id.clone());
        }
        for required in direct {
            match self.graph.component(&required.id) {
                Some(dep) if visited.insert(dep.id.clone()) => queue.push_back((dep, 1usize)),
                Some(_) => {}
                None if required.optional => {
                    trace!(requester = %requester.id, missing = %required.id, "skipping optional requirement")
                }
                None => {
                    warn!(requester = %requester.id, missing = %required.id, "unresolved mandatory requirement")
                }
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            let visible = current
                .export(package)
                .is_some_and(|e| e.is_visible_to(&current.id, &requester.id, requester.host.as_ref()));
            if visible {
                found.insert(current.id.clone());
            }
            if depth >= self.options.max_depth {
                continue;
            }
            for required in current.requires.iter().filter(|r| r.reexport) {
                if let Some(dep) = self.graph.component(&required.id) {
                    if visited.insert(dep.id.clone()) {
                        queue.push_back((dep, depth + 1));
                    }
                }
            }
        }

        found
    }

    /// Drop the cache when the graph generation moved. Returns the current
    /// generation.
    fn sync_generation(&self) -> u64 {
        let current = self.graph.generation();
        let seen = self.generation.swap(current, Ordering::AcqRel);
        if seen != current {
            debug!(from = seen, to = current, "component graph changed, clearing package cache");
            self.cache.clear();
        }
        current
    }

    /// Forget every cached answer.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Forget cached answers for one package. Returns whether any existed.
    pub fn clear_package(&self, package: &str) -> bool {
        self.cache.remove(package).is_some()
    }

    pub fn clear_packages<I, S>(&self, packages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for package in packages {
            self.clear_package(package.as_ref());
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            packages: self.cache.len(),
            entries: self.cache.iter().map(|entry| entry.value().len()).sum(),
        }
    }
}

impl std::fmt::Debug for PackageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageResolver")
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish()
    }
}
