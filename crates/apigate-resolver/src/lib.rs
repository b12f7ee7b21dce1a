//! # apigate-resolver
//!
//! Cross-component package resolution for API checks.
//!
//! A [`ComponentState`] holds the components of a baseline: their local and
//! exported packages and their required components. A [`PackageResolver`]
//! answers "which components make package `P` visible to component `R`?" and
//! memoizes every answer per `(P, R)` until the graph changes. The
//! [`Baseline`] registry ties both together with lazily created API
//! descriptions for every component.
//!
//! ```rust
//! use apigate_resolver::{Baseline, Component, ExportedPackage, RequiredComponent};
//! use apigate_index::ComponentId;
//!
//! let baseline = Baseline::new(Default::default());
//! baseline
//!     .add_components(vec![
//!         Component::builder("core")
//!             .packages(["core.api"])
//!             .export(ExportedPackage::new("core.api"))
//!             .build(),
//!         Component::builder("app")
//!             .require(RequiredComponent::new("core"))
//!             .build(),
//!     ])
//!     .unwrap();
//!
//! let providers = baseline
//!     .resolve_package(&ComponentId::new("app"), "core.api")
//!     .unwrap();
//! assert_eq!(providers.as_ref(), [ComponentId::new("core")]);
//! ```

pub mod baseline;
pub mod component;
pub mod graph;
pub mod resolver;
pub mod seed;
pub mod state;

pub use baseline::Baseline;
pub use component::{Component, ComponentBuilder, ExportedPackage, RequiredComponent};
pub use graph::ComponentGraph;
pub use resolver::{CacheStats, PackageResolver, Providers, ResolverOptions};
pub use seed::annotate_component;
pub use state::ComponentState;

use apigate_index::{ComponentId, IndexError};

/// Error types for resolution and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The requesting component is not part of the graph.
    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    /// A component with the same id is already registered.
    #[error("duplicate component: {0}")]
    DuplicateComponent(ComponentId),

    /// Writing to an API description failed.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
