//! Pluggable config validation strategies

use crate::config::ApigateConfig;
use crate::error::{ConfigError, Result};
use crate::settings::GlobalSettings;

pub trait ConfigValidator {
    fn validate(&self, config: &ApigateConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use apigate_config::{ApigateConfig, ConfigValidator, SchemaValidator};
///
/// SchemaValidator.validate(&ApigateConfig::default()).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &ApigateConfig) -> Result<()> {
        let resolver = &config.resolver;

        if resolver.max_depth == 0 {
            return Err(ConfigError::schema(
                "resolver.max_depth must be greater than 0",
                "Direct dependencies are depth 1; use at least 1",
            ));
        }

        for prefix in &resolver.system_package_prefixes {
            if prefix.trim().is_empty() {
                return Err(ConfigError::schema(
                    "system package prefixes cannot be empty",
                    "Remove empty strings from 'system_package_prefixes'",
                ));
            }
        }

        for package in &resolver.system_packages {
            if !is_package_name(package) {
                return Err(ConfigError::schema(
                    format!("'{package}' is not a valid package name"),
                    "Use dot-separated identifiers such as 'org.w3c.dom'",
                ));
            }
        }

        if resolver
            .system_library
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(ConfigError::schema(
                "system_library cannot be empty",
                "Remove the key or name the platform component",
            ));
        }

        let version = config.index.format_version;
        if !version.is_finite() || version <= 0.0 {
            return Err(ConfigError::schema(
                format!("index.format_version {version} must be a positive number"),
                "The current format version is 1.2",
            ));
        }

        validate_settings(&config.settings)
    }
}

fn validate_settings(settings: &GlobalSettings) -> Result<()> {
    if let Some(level) = settings.log_level.as_deref() {
        if !GlobalSettings::LOG_LEVELS.contains(&level) {
            return Err(ConfigError::schema(
                format!("unknown log level '{level}'"),
                format!("Use one of: {}", GlobalSettings::LOG_LEVELS.join(", ")),
            ));
        }
    }
    if let Some(format) = settings.log_format.as_deref() {
        if !GlobalSettings::LOG_FORMATS.contains(&format) {
            return Err(ConfigError::schema(
                format!("unknown log format '{format}'"),
                format!("Use one of: {}", GlobalSettings::LOG_FORMATS.join(", ")),
            ));
        }
    }
    Ok(())
}

/// Dot-separated Java-style identifiers.
fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &ApigateConfig) -> Result<()> {
    SchemaValidator.validate(config)
}
