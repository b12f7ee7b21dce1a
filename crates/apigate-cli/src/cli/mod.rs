//! Command-line interface definition for apigate.
//!
//! - `apigate resolve <REQUESTER> <PACKAGE>` - components supplying a package
//! - `apigate describe <COMPONENT>` - seeded API description of a component
//! - `apigate check` - configuration and component graph validation

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{CheckArgs, Command, DescribeArgs, GraphArgs, ResolveArgs};

/// Apigate - API visibility checks for modular components
#[derive(Parser, Debug)]
#[command(
    name = "apigate",
    version,
    about = "API visibility checks for modular components",
    long_about = "Apigate tracks which packages of a component are API, which are internal\n\
                  or friend-only, and which components supply a package to a requester."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ./apigate.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile merged over the base settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolve_with_global_flags() {
        let cli = Cli::try_parse_from([
            "apigate",
            "resolve",
            "org.acme.ui",
            "org.acme.core",
            "--graph",
            "graph.toml",
            "--profile",
            "strict",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.profile.as_deref(), Some("strict"));
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.requester, "org.acme.ui");
                assert_eq!(args.package, "org.acme.core");
                assert_eq!(args.graph.graph, PathBuf::from("graph.toml"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn graph_defaults_to_components_toml() {
        let cli = Cli::try_parse_from(["apigate", "check"]).unwrap();
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.graph.graph, PathBuf::from("components.toml"))
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["apigate", "-v", "-q", "check"]).is_err());
    }
}
