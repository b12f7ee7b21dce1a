//! Apigate CLI - API visibility checks for modular components.
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `resolve`, `describe` and `check`
//! - [`graph_file`] - TOML component graph files
//! - [`error`] - CLI error type and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status messages
//!
//! ```rust
//! use apigate_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, true);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod graph_file;
pub mod logger;
pub mod ui;
