//! Command implementations.
//!
//! Each command loads the component graph named by `--graph`, builds a
//! [`Baseline`] from the configuration and prints its answer on stdout.

pub mod check;
pub mod describe;
pub mod resolve;

use std::path::Path;

use apigate_config::{ApigateConfig, ConfigDiscovery, ConfigError, validate_schema};
use apigate_resolver::Baseline;

use crate::cli::Command;
use crate::error::Result;
use crate::graph_file::GraphFile;

pub use check::execute as check_execute;
pub use describe::execute as describe_execute;
pub use resolve::execute as resolve_execute;

pub fn execute(command: Command, config: &ApigateConfig) -> Result<()> {
    match command {
        Command::Resolve(args) => resolve_execute(args, config),
        Command::Describe(args) => describe_execute(args, config),
        Command::Check(args) => check_execute(args, config),
    }
}

/// Load `path` (or `./apigate.toml`, or defaults), apply `profile`, validate.
pub fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<ApigateConfig> {
    let config = match path {
        Some(path) => ConfigDiscovery::load_file(path)?,
        None => ConfigDiscovery::new(std::env::current_dir()?).load_or_default()?,
    };

    if let Some(name) = profile {
        if !config.profiles.contains_key(name) {
            return Err(ConfigError::InvalidValue {
                field: "profile".to_string(),
                hint: Some(format!("no profile named '{name}' in the configuration")),
            }
            .into());
        }
    }

    let config = config.materialize_profile(profile)?;
    validate_schema(&config)?;
    Ok(config)
}

pub(crate) fn build_baseline(config: &ApigateConfig, graph: GraphFile) -> Result<Baseline> {
    let baseline = Baseline::new(config.resolver_options())
        .with_format_version(config.index.format_version);
    baseline.add_components(graph.components)?;
    Ok(baseline)
}
