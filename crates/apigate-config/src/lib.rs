//! # apigate-config
//!
//! Layered configuration for apigate: built-in defaults, then `apigate.toml`,
//! then `APIGATE_*` environment variables, with optional named profiles
//! merged on top.
//!
//! ```toml
//! [resolver]
//! system_package_prefixes = ["java.", "javax."]
//! system_library = "jre"
//! max_depth = 50
//!
//! [index]
//! format_version = 1.2
//!
//! [settings]
//! log_level = "info"
//!
//! [profiles.strict.resolver]
//! max_depth = 1
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod settings;
pub mod validation;

pub use config::{ApigateConfig, IndexSettings, ProfileConfig, ResolverSettings};
pub use error::{ConfigError, Result};
pub use settings::GlobalSettings;

pub use discovery::{
    CONFIG_FILE_NAME, ConfigDiscovery, ENV_PREFIX, discover, discover_with_profile,
};
pub use validation::{ConfigValidator, SchemaValidator, validate_schema};
