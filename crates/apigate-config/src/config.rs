//! High-level configuration structure for apigate.
//!
//! This module provides the main `ApigateConfig` struct and profile merging
//! logic. For file discovery, see the `discovery` module.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use apigate_index::{CURRENT_FORMAT_VERSION, ComponentId};
use apigate_resolver::ResolverOptions;

use crate::error::{ConfigError, Result as ConfigResult};
use crate::settings::GlobalSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApigateConfig {
    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub settings: GlobalSettings,

    #[serde(default)]
    pub profiles: IndexMap<String, ProfileConfig>,
}

/// Package resolution settings, converted to [`ResolverOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub system_package_prefixes: Vec<String>,
    pub system_packages: Vec<String>,
    /// Component standing in for the platform library.
    pub system_library: Option<String>,
    pub max_depth: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        let options = ResolverOptions::default();
        Self {
            system_package_prefixes: options.system_package_prefixes,
            system_packages: options.system_packages,
            system_library: options.system_library.map(|id| id.as_str().to_string()),
            max_depth: options.max_depth,
        }
    }
}

impl ResolverSettings {
    pub fn to_options(&self) -> ResolverOptions {
        ResolverOptions {
            system_package_prefixes: self.system_package_prefixes.clone(),
            system_packages: self.system_packages.clone(),
            system_library: self.system_library.as_deref().map(ComponentId::new),
            max_depth: self.max_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Format version stamped on newly created indices.
    pub format_version: f32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
        }
    }
}

/// Partial overrides applied on top of the base sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub resolver: Value,

    #[serde(default)]
    pub index: Value,

    #[serde(default)]
    pub settings: Value,
}

impl ApigateConfig {
    /// Create from a `serde_json::Value`.
    ///
    /// # Example
    ///
    /// ```
    /// use apigate_config::ApigateConfig;
    /// use serde_json::json;
    ///
    /// let config = ApigateConfig::from_value(json!({
    ///     "resolver": { "max_depth": 4 }
    /// }))
    /// .unwrap();
    /// assert_eq!(config.resolver.max_depth, 4);
    /// assert_eq!(config.resolver.system_package_prefixes, vec!["java.".to_string()]);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        self.resolver.to_options()
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Apply the overrides of `profile` to the base sections. Unknown profiles
    /// leave the configuration unchanged.
    pub fn materialize_profile(mut self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };
        let Some(overrides) = self.profiles.get(name).cloned() else {
            warn!(profile = %name, "unknown profile, using base configuration");
            return Ok(self);
        };

        merge_section(&mut self.resolver, &overrides.resolver)?;
        merge_section(&mut self.index, &overrides.index)?;
        merge_section(&mut self.settings, &overrides.settings)?;
        Ok(self)
    }
}

fn merge_section<T>(section: &mut T, overrides: &Value) -> ConfigResult<()>
where
    T: Serialize + DeserializeOwned,
{
    if overrides.is_null() {
        return Ok(());
    }
    let mut base = serde_json::to_value(&*section).map_err(|err| {
        ConfigError::InvalidProfileOverride {
            message: err.to_string(),
        }
    })?;
    merge_values(&mut base, overrides);
    *section = serde_json::from_value(base).map_err(|err| ConfigError::InvalidProfileOverride {
        message: err.to_string(),
    })?;
    Ok(())
}

/// Deep-merge `update` into `target`: objects merge key by key, everything
/// else (arrays included) replaces.
pub(crate) fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}
