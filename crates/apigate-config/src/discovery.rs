//! File-based config discovery for CLI use
//!
//! Layers defaults, `apigate.toml` and `APIGATE_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use tracing::debug;

use crate::config::ApigateConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "apigate.toml";

/// Prefix of environment overrides; nested keys are separated by `__`, as in
/// `APIGATE_RESOLVER__MAX_DEPTH=8`.
pub const ENV_PREFIX: &str = "APIGATE_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use apigate_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Location of `apigate.toml` under the root, if it exists.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        path.is_file().then_some(path)
    }

    /// Load the discovered config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<ApigateConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        load_layers(Some(&path))
    }

    /// Load the discovered config file, falling back to defaults and
    /// environment overrides when there is none.
    pub fn load_or_default(&self) -> Result<ApigateConfig> {
        load_layers(self.find().as_deref())
    }

    pub fn load_with_profile(&self, profile: &str) -> Result<ApigateConfig> {
        self.load()?.materialize_profile(Some(profile))
    }

    /// Load an explicitly named config file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<ApigateConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        load_layers(Some(path))
    }
}

/// Priority: environment > config file > defaults.
fn load_layers(file: Option<&Path>) -> Result<ApigateConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(ApigateConfig::default()));
    if let Some(path) = file {
        debug!(path = %path.display(), "loading configuration");
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Discover and load config from the current directory.
pub fn discover() -> Result<ApigateConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

pub fn discover_with_profile(profile: &str) -> Result<ApigateConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load_with_profile(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_discovers_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[resolver]\nmax_depth = 3\n").unwrap();

        assert_eq!(ConfigDiscovery::new(dir.path()).find().unwrap(), path);
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path()).load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn load_file_reports_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = ConfigDiscovery::load_file(&missing);
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(p) if p == missing));
    }
}
