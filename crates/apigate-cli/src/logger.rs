//! Logging setup for the apigate CLI.
//!
//! The level is chosen in this order:
//! 1. `--verbose`: DEBUG for apigate crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. `settings.log_level` from the configuration
//! 5. INFO for apigate crates
//!
//! ```rust,no_run
//! use apigate_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("resolving packages");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use apigate_config::GlobalSettings;

const CRATES: &[&str] = &[
    "apigate_cli",
    "apigate_config",
    "apigate_index",
    "apigate_resolver",
];

/// Filter setting `level` for every apigate crate.
pub fn crate_filter(level: &str) -> EnvFilter {
    let directives: Vec<String> = CRATES.iter().map(|krate| format!("{krate}={level}")).collect();
    EnvFilter::new(directives.join(","))
}

fn select_filter(verbose: bool, quiet: bool, configured: Option<&str>) -> EnvFilter {
    if verbose {
        crate_filter("debug")
    } else if quiet {
        crate_filter("error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| crate_filter(configured.unwrap_or("info")))
    }
}

/// Initialize the global subscriber with a compact formatter.
///
/// Call once, before any logging occurs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(select_filter(verbose, quiet, None), no_color);
}

/// Like [`init_logger`], honoring `log_level` and `log_format` from the
/// configuration.
pub fn init_logger_with_settings(
    verbose: bool,
    quiet: bool,
    no_color: bool,
    settings: &GlobalSettings,
) {
    let filter = select_filter(verbose, quiet, settings.log_level.as_deref());
    if settings.log_format.as_deref() == Some("full") {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(!no_color);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        init_logger_with_filter(filter, no_color);
    }
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
