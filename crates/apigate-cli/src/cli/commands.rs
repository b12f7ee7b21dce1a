use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available apigate subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the components that make a package visible to a requester
    ///
    /// Providers are printed one per line: the requester (or its host) first
    /// when it contains the package, then required components in declaration
    /// order, following re-exports.
    Resolve(ResolveArgs),

    /// Print the API description seeded from a component's exports
    ///
    /// Every element is printed with its resolved visibility and restrictions.
    /// Hosts include the elements of their fragments.
    Describe(DescribeArgs),

    /// Validate configuration and the component graph
    ///
    /// Reports unresolved mandatory requirements and fragments whose host is
    /// missing. Exits with a non-zero status when problems are found.
    Check(CheckArgs),
}

/// Location of the component graph file
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// TOML file with `[[component]]` tables
    #[arg(short, long, value_name = "FILE", default_value = "components.toml")]
    pub graph: PathBuf,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Component asking for the package
    #[arg(value_name = "REQUESTER")]
    pub requester: String,

    /// Package name, e.g. `org.acme.core`
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    #[command(flatten)]
    pub graph: GraphArgs,
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[arg(value_name = "COMPONENT")]
    pub component: String,

    #[command(flatten)]
    pub graph: GraphArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
}
