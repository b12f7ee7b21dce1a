//! Error handling for the apigate CLI.
//!
//! `CliError` wraps the library errors via `#[from]`; [`cli_error_to_miette`]
//! turns it into a diagnostic at the top of `main`.

mod report;

use std::path::PathBuf;

use thiserror::Error;

use apigate_config::ConfigError;
use apigate_resolver::ResolveError;

pub use report::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("Graph file not found: {}", .0.display())]
    GraphNotFound(PathBuf),

    #[error("Invalid graph file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Check failed with {problems} problem(s)")]
    CheckFailed { problems: usize },
}

pub type Result<T> = std::result::Result<T, CliError>;
