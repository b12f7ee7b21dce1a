//! # apigate-index
//!
//! Hierarchical API annotation index for modular components.
//!
//! Every declared program element (package, type, method, field) can carry a
//! [`Visibility`] (is it part of the public API?) and a [`RestrictionSet`]
//! (may it be extended, implemented, instantiated, overridden, referenced?).
//! This crate stores those annotations in a tree keyed by [`ElementDescriptor`]
//! and resolves them with inheritance.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ApiDescription (trait)                      │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!      ┌──────────────────┐           ┌──────────────────┐
//!      │ AnnotationIndex  │◀──────────│  CompositeIndex  │
//!      │ (arena of nodes) │  1..N     │  (first hit wins)│
//!      └────────┬─────────┘           └──────────────────┘
//!               │ optional
//!               ▼
//!      ┌──────────────────┐
//!      │   LiveBacking    │  ElementSource + FingerprintProvider
//!      │ (change-driven   │  re-derive annotations when the
//!      │    refresh)      │  backing declaration changed
//!      └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use apigate_index::{
//!     AnnotationIndex, ApiDescription, ElementDescriptor, RestrictionSet, Visibility,
//! };
//!
//! let index = AnnotationIndex::new(None);
//! let package = ElementDescriptor::package("com.acme.util");
//! let internal = ElementDescriptor::type_("com.acme.util", "Internal");
//! let helper = internal.method("helper", "()V");
//!
//! index.set_visibility(&package, Visibility::Api).unwrap();
//! index.set_visibility(&internal, Visibility::Private).unwrap();
//!
//! let resolved = index.resolve_annotations(&helper).unwrap();
//! assert_eq!(resolved.visibility, Visibility::Private);
//! assert_eq!(resolved.restrictions, RestrictionSet::NO_RESTRICTIONS);
//! ```
//!
//! ## Thread Safety
//!
//! Each [`AnnotationIndex`] serializes its own mutations behind a
//! `parking_lot::Mutex`. Two indices never share a lock, so indices owned by
//! different components can be mutated concurrently.

pub mod annotations;
pub mod component_id;
pub mod composite;
pub mod description;
pub mod descriptor;
mod index;
pub mod live;

pub use annotations::{AccessLevel, Annotations, RestrictionSet, Visibility};
pub use component_id::ComponentId;
pub use composite::CompositeIndex;
pub use description::{AnnotationSink, ApiDescription, DescriptionVisitor};
pub use descriptor::{ElementDescriptor, ElementKind};
pub use index::{AnnotationIndex, CURRENT_FORMAT_VERSION};
pub use live::{
    DeclarationHandle, ElementSource, Fingerprint, FingerprintProvider, InMemorySource,
    RefreshState, SourceUnavailable,
};

/// Error types for index operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// A write targeted an element whose node cannot be materialized.
    #[error("element not found: {element} in {owner}")]
    ElementNotFound {
        /// Qualified name of the element.
        element: String,
        /// Owning component, or `<none>`.
        owner: String,
    },
}

impl IndexError {
    pub(crate) fn element_not_found(
        element: &ElementDescriptor,
        owner: Option<&ComponentId>,
    ) -> Self {
        Self::ElementNotFound {
            element: element.to_string(),
            owner: owner.map_or_else(|| "<none>".to_string(), ToString::to_string),
        }
    }
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests;
