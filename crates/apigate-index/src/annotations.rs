//! Annotation values stored on index nodes.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Whether an element belongs to the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Take the visibility of the nearest annotated ancestor.
    #[default]
    Inherited,
    Api,
    Private,
    /// Private, but references are tolerated (discouraged access).
    PrivatePermissible,
    Spi,
}

impl Visibility {
    pub fn is_inherited(self) -> bool {
        matches!(self, Visibility::Inherited)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Visibility::Inherited => "INHERITED",
            Visibility::Api => "API",
            Visibility::Private => "PRIVATE",
            Visibility::PrivatePermissible => "PRIVATE_PERMISSIBLE",
            Visibility::Spi => "SPI",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Usage restrictions on a single element.
    ///
    /// Flags compose with bitwise OR. Restrictions are never inherited: they
    /// apply only to the node they were written on.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RestrictionSet: u32 {
        const NO_EXTEND = 1 << 0;
        const NO_IMPLEMENT = 1 << 1;
        const NO_INSTANTIATE = 1 << 2;
        const NO_REFERENCE = 1 << 3;
        const NO_OVERRIDE = 1 << 4;
    }
}

impl RestrictionSet {
    pub const NO_RESTRICTIONS: Self = Self::empty();
}

impl fmt::Display for RestrictionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NO_RESTRICTIONS");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Resolved annotations of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotations {
    pub visibility: Visibility,
    pub restrictions: RestrictionSet,
}

impl Annotations {
    pub fn new(visibility: Visibility, restrictions: RestrictionSet) -> Self {
        Self {
            visibility,
            restrictions,
        }
    }
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.visibility, self.restrictions)
    }
}

/// Access granted to a friend component on an otherwise private package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Normal,
    Friend,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Normal => f.write_str("normal"),
            AccessLevel::Friend => f.write_str("friend"),
        }
    }
}
