//! Config CLI commands.

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::{ConfigStore, JsonConfigStore};
use crate::error::WallpaperdError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Show the path to the configuration file and whether it exists.
    Path,

    /// Print the effective configuration as JSON.
    ///
    /// A missing file prints the defaults.
    Show,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration path cannot be determined or the
/// file cannot be read.
pub fn execute(custom_path: Option<&str>, cmd: &ConfigCommands) -> Result<(), WallpaperdError> {
    let store = JsonConfigStore::from_override(custom_path)?;

    match cmd {
        ConfigCommands::Path => {
            let marker = if store.path().exists() {
                "(exists)".green()
            } else {
                "(not created yet)".dimmed()
            };
            println!("{} {marker}", store.path().display());
            Ok(())
        }
        ConfigCommands::Show => output::print_json(&store.read()?),
    }
}
