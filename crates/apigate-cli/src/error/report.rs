//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use apigate_config::ConfigError;
use apigate_resolver::ResolveError;

use crate::error::CliError;

pub fn cli_error_to_miette(err: CliError) -> Report {
    match &err {
        CliError::Config(config) => match config.hint() {
            Some(hint) => miette::miette!(help = hint.to_string(), "{}", err),
            None => miette::miette!("{}", err),
        },
        CliError::Resolve(ResolveError::UnknownComponent(id)) => miette::miette!(
            help = format!("Add a [[component]] table with id = \"{id}\" to the graph file"),
            "{}",
            err
        ),
        CliError::GraphNotFound(_) => miette::miette!(
            help = "Pass the component graph with --graph <FILE>",
            "{}",
            err
        ),
        CliError::CheckFailed { .. } => miette::miette!(
            help = "Run with --verbose to see how each component was resolved",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}
