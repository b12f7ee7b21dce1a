//! Structural identifiers for declared program elements.
//!
//! A descriptor names an element by its declaration path: package, then the
//! chain of enclosing types, then (for members) the member itself. Nested type
//! names use `$` separators (`Outer$Inner`), so every enclosing type is
//! recoverable from the descriptor alone.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Closed set of element kinds tracked by an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Package,
    Type,
    Method,
    Field,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Package => "package",
            ElementKind::Type => "type",
            ElementKind::Method => "method",
            ElementKind::Field => "field",
        };
        f.write_str(name)
    }
}

/// Immutable structural key for a package, type, method or field.
///
/// Equality and hashing are structural. Ordering compares qualified names and
/// exists only to make traversal and export order deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementDescriptor {
    kind: ElementKind,
    package: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_name: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member: Option<Arc<str>>,
    /// Methods only: overloads share a name, the signature tells them apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Arc<str>>,
}

impl ElementDescriptor {
    /// Descriptor for a package. The default package has the empty name.
    pub fn package(name: impl AsRef<str>) -> Self {
        Self {
            kind: ElementKind::Package,
            package: Arc::from(name.as_ref()),
            type_name: None,
            member: None,
            signature: None,
        }
    }

    /// Descriptor for a type. `type_name` is relative to the package and uses
    /// `$` between enclosing and nested types.
    pub fn type_(package: impl AsRef<str>, type_name: impl AsRef<str>) -> Self {
        Self {
            kind: ElementKind::Type,
            package: Arc::from(package.as_ref()),
            type_name: Some(Arc::from(type_name.as_ref())),
            member: None,
            signature: None,
        }
    }

    /// Descriptor for a type given its fully qualified name (`a.b.Outer$Inner`).
    pub fn qualified_type(qualified: &str) -> Self {
        match qualified.rfind('.') {
            Some(dot) => Self::type_(&qualified[..dot], &qualified[dot + 1..]),
            None => Self::type_("", qualified),
        }
    }

    /// Method declared by this type (or by the enclosing type of a member).
    pub fn method(&self, name: impl AsRef<str>, signature: impl AsRef<str>) -> Self {
        Self {
            kind: ElementKind::Method,
            package: self.package.clone(),
            type_name: self.type_name.clone(),
            member: Some(Arc::from(name.as_ref())),
            signature: Some(Arc::from(signature.as_ref())),
        }
    }

    /// Field declared by this type (or by the enclosing type of a member).
    pub fn field(&self, name: impl AsRef<str>) -> Self {
        Self {
            kind: ElementKind::Field,
            package: self.package.clone(),
            type_name: self.type_name.clone(),
            member: Some(Arc::from(name.as_ref())),
            signature: None,
        }
    }

    /// Type nested directly inside this type. On a package descriptor this
    /// yields a top-level type of the package.
    pub fn nested_type(&self, simple_name: impl AsRef<str>) -> Self {
        let type_name = match &self.type_name {
            Some(outer) => format!("{outer}${}", simple_name.as_ref()),
            None => simple_name.as_ref().to_string(),
        };
        Self::type_(&*self.package, type_name)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// Package-relative type name (`Outer$Inner`) for types and members.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Member name for methods and fields.
    pub fn member_name(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Simple name of this element (last path segment).
    pub fn name(&self) -> &str {
        match self.kind {
            ElementKind::Package => &self.package,
            ElementKind::Type => {
                let type_name = self.type_name.as_deref().unwrap_or_default();
                type_name.rsplit('$').next().unwrap_or(type_name)
            }
            ElementKind::Method | ElementKind::Field => self.member.as_deref().unwrap_or_default(),
        }
    }

    /// Descriptor of the package that contains this element.
    pub fn package_descriptor(&self) -> Self {
        Self::package(&*self.package)
    }

    /// Type that directly encloses this element, if any.
    pub fn enclosing_type(&self) -> Option<Self> {
        match self.kind {
            ElementKind::Package => None,
            ElementKind::Type => {
                let type_name = self.type_name.as_deref()?;
                let (outer, _) = type_name.rsplit_once('$')?;
                Some(Self::type_(&*self.package, outer))
            }
            ElementKind::Method | ElementKind::Field => {
                let type_name = self.type_name.as_deref()?;
                Some(Self::type_(&*self.package, type_name))
            }
        }
    }

    /// Direct parent in the declaration tree.
    pub fn parent(&self) -> Option<Self> {
        match self.kind {
            ElementKind::Package => None,
            _ => self
                .enclosing_type()
                .or_else(|| Some(self.package_descriptor())),
        }
    }

    /// Full ancestor chain, root first, ending with this descriptor.
    pub fn path(&self) -> Vec<Self> {
        let mut path = vec![self.package_descriptor()];
        if self.kind == ElementKind::Package {
            return path;
        }

        if let Some(type_name) = self.type_name.as_deref() {
            let mut end = 0;
            for segment in type_name.split('$') {
                end += segment.len();
                path.push(Self::type_(&*self.package, &type_name[..end]));
                end += 1;
            }
        }

        if matches!(self.kind, ElementKind::Method | ElementKind::Field) {
            path.push(self.clone());
        }
        path
    }

    /// Whether an index can materialize a node for this descriptor.
    ///
    /// Types need non-empty segment names; members additionally need an
    /// enclosing type and a name.
    pub fn is_well_formed(&self) -> bool {
        let type_ok = |name: Option<&str>| {
            name.is_some_and(|name| !name.is_empty() && name.split('$').all(|s| !s.is_empty()))
        };
        match self.kind {
            ElementKind::Package => true,
            ElementKind::Type => type_ok(self.type_name.as_deref()),
            ElementKind::Method | ElementKind::Field => {
                type_ok(self.type_name.as_deref())
                    && self.member.as_deref().is_some_and(|m| !m.is_empty())
            }
        }
    }

    /// Qualified name: `a.b`, `a.b.Outer$Inner`, `a.b.Type#method(I)V`, `a.b.Type#field`.
    pub fn qualified_name(&self) -> String {
        let mut out = String::new();
        self.write_qualified(&mut out);
        out
    }

    fn write_qualified(&self, out: &mut String) {
        out.push_str(&self.package);
        if let Some(type_name) = self.type_name.as_deref() {
            if !self.package.is_empty() {
                out.push('.');
            }
            out.push_str(type_name);
        }
        if let Some(member) = self.member.as_deref() {
            out.push('#');
            out.push_str(member);
        }
        if let Some(signature) = self.signature.as_deref() {
            out.push_str(signature);
        }
    }
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

impl PartialOrd for ElementDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ElementDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.qualified_name()
            .cmp(&other.qualified_name())
            .then_with(|| self.kind.cmp(&other.kind))
            // keeps the order total and consistent with Eq
            .then_with(|| self.package.cmp(&other.package))
            .then_with(|| self.type_name.cmp(&other.type_name))
            .then_with(|| self.member.cmp(&other.member))
            .then_with(|| self.signature.cmp(&other.signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_path_is_itself() {
        let pkg = ElementDescriptor::package("com.acme");
        assert_eq!(pkg.path(), vec![pkg.clone()]);
        assert!(pkg.parent().is_none());
    }

    #[test]
    fn nested_type_path_includes_enclosing_types() {
        let deep = ElementDescriptor::type_("a.b", "Outer$Inner$Deep");
        let path = deep.path();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], ElementDescriptor::package("a.b"));
        assert_eq!(path[1], ElementDescriptor::type_("a.b", "Outer"));
        assert_eq!(path[2], ElementDescriptor::type_("a.b", "Outer$Inner"));
        assert_eq!(path[3], deep);
        assert_eq!(deep.name(), "Deep");
    }

    #[test]
    fn member_path_ends_with_member() {
        let ty = ElementDescriptor::type_("a", "T");
        let method = ty.method("run", "()V");
        let path = method.path();
        assert_eq!(path.last(), Some(&method));
        assert_eq!(method.parent(), Some(ty));
        assert_eq!(method.qualified_name(), "a.T#run()V");
    }

    #[test]
    fn overloads_are_distinct() {
        let ty = ElementDescriptor::type_("a", "T");
        assert_ne!(ty.method("m", "()V"), ty.method("m", "(I)V"));
    }

    #[test]
    fn qualified_type_splits_package() {
        let ty = ElementDescriptor::qualified_type("com.acme.util.Internal$Helper");
        assert_eq!(ty.package_name(), "com.acme.util");
        assert_eq!(ty.type_name(), Some("Internal$Helper"));

        let default_pkg = ElementDescriptor::qualified_type("Main");
        assert_eq!(default_pkg.package_name(), "");
        assert_eq!(default_pkg.qualified_name(), "Main");
    }

    #[test]
    fn malformed_descriptors_are_detected() {
        assert!(!ElementDescriptor::type_("a", "").is_well_formed());
        assert!(!ElementDescriptor::type_("a", "Outer$").is_well_formed());
        assert!(!ElementDescriptor::package("a").method("m", "()V").is_well_formed());
        assert!(ElementDescriptor::type_("a", "T").field("f").is_well_formed());
    }

    #[test]
    fn ordering_follows_qualified_names() {
        let mut items = vec![
            ElementDescriptor::package("b"),
            ElementDescriptor::package("a.z"),
            ElementDescriptor::package("a"),
        ];
        items.sort();
        let names: Vec<_> = items.iter().map(|d| d.qualified_name()).collect();
        assert_eq!(names, vec!["a", "a.z", "b"]);
    }
}
