//! CLI module for wallpaperd.
//!
//! Without a subcommand the binary runs the daemon. Every other subcommand is
//! a one-shot operation against the same configuration and playlist files.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;
use tracing_subscriber::EnvFilter;

use crate::error::WallpaperdError;

/// Runs the CLI.
///
/// Parses command-line arguments, installs the log subscriber and executes
/// the selected command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), WallpaperdError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute()
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

const fn default_filter(verbose: bool) -> &'static str { if verbose { "debug" } else { "info" } }
