//! Component model consumed by the resolver.
//!
//! Mirrors what a bundle manifest declares: local packages, exported packages
//! with friend and internal directives, required components, and the host of
//! a fragment.

use serde::{Deserialize, Serialize};

use apigate_index::ComponentId;

/// A package exported by a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPackage {
    pub name: String,
    /// Components allowed to see the package even though it is not API.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<ComponentId>,
    /// Exported for internal use only (`x-internal`).
    #[serde(default)]
    pub internal: bool,
    /// Part of a split package rather than its root export.
    #[serde(default)]
    pub split: bool,
}

impl ExportedPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            friends: Vec::new(),
            internal: false,
            split: false,
        }
    }

    pub fn friends<I, S>(mut self, friends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ComponentId>,
    {
        self.friends = friends.into_iter().map(Into::into).collect();
        self
    }

    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    /// Whether this export (owned by `owner`) makes the package visible to
    /// `requester`. A fragment requester also sees what its host may see.
    pub fn is_visible_to(
        &self,
        owner: &ComponentId,
        requester: &ComponentId,
        requester_host: Option<&ComponentId>,
    ) -> bool {
        if owner == requester {
            return true;
        }
        if self.split {
            return false;
        }
        let is_friend = |id: &ComponentId| self.friends.contains(id);
        if is_friend(requester) || requester_host.is_some_and(is_friend) {
            return true;
        }
        !self.internal && self.friends.is_empty()
    }
}

/// A dependency on another component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredComponent {
    pub id: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// The requiring component re-exports the packages of this dependency.
    #[serde(default)]
    pub reexport: bool,
}

impl RequiredComponent {
    pub fn new(id: impl Into<ComponentId>) -> Self {
        Self {
            id: id.into(),
            version_range: None,
            optional: false,
            reexport: false,
        }
    }

    pub fn version_range(mut self, range: impl Into<String>) -> Self {
        self.version_range = Some(range.into());
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn reexport(mut self, reexport: bool) -> Self {
        self.reexport = reexport;
        self
    }
}

/// One deployable unit of a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Packages physically contained in the component.
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub exports: Vec<ExportedPackage>,
    #[serde(default)]
    pub requires: Vec<RequiredComponent>,
    /// Set for fragments: the component they attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<ComponentId>,
}

impl Component {
    pub fn builder(id: impl Into<ComponentId>) -> ComponentBuilder {
        ComponentBuilder {
            component: Component {
                id: id.into(),
                version: None,
                packages: Vec::new(),
                exports: Vec::new(),
                requires: Vec::new(),
                host: None,
            },
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.host.is_some()
    }

    pub fn declares_package(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    pub fn export(&self, package: &str) -> Option<&ExportedPackage> {
        self.exports.iter().find(|e| e.name == package)
    }
}

pub struct ComponentBuilder {
    component: Component,
}

impl ComponentBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.component.version = Some(version.into());
        self
    }

    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.component.packages.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn export(mut self, export: ExportedPackage) -> Self {
        self.component.exports.push(export);
        self
    }

    pub fn require(mut self, required: RequiredComponent) -> Self {
        self.component.requires.push(required);
        self
    }

    pub fn host(mut self, host: impl Into<ComponentId>) -> Self {
        self.component.host = Some(host.into());
        self
    }

    pub fn build(self) -> Component {
        self.component
    }
}
