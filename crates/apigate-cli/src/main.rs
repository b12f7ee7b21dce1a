//! Apigate CLI entry point: argument parsing, configuration, logging and
//! command dispatch.

use clap::Parser;
use miette::Result;

use apigate_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let result = commands::load_config(args.config.as_deref(), args.profile.as_deref())
        .and_then(|config| {
            logger::init_logger_with_settings(
                args.verbose,
                args.quiet,
                args.no_color,
                &config.settings,
            );
            ui::init_colors(args.no_color);
            commands::execute(args.command, &config)
        });

    // Convert CLI errors to miette diagnostics
    result.map_err(error::cli_error_to_miette)
}
