//! Wallpaper browser filter commands.
//!
//! Wallpaper Engine remembers the filters of its installed and workshop tabs
//! in its own `config.json`. These commands read and replace them.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::{Map, Value};

use crate::cli::output;
use crate::config::{ConfigStore, JsonConfigStore};
use crate::error::WallpaperdError;
use crate::modules::playlist::{BrowseTab, EnginePlaylists};

/// Browser filter commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum FiltersCommands {
    /// Print the saved filters as JSON.
    Show {
        #[command(flatten)]
        tab: TabArg,
    },

    /// Replace the saved filters.
    #[command(after_long_help = r#"Examples:
  wallpaperd filters set '{"type": {"scene": true, "video": false}}'
  wallpaperd filters set --workshop '{}'"#)]
    Set {
        #[command(flatten)]
        tab: TabArg,
        /// Filters as a JSON object.
        filters: String,
    },
}

/// Selects the browser tab.
#[derive(Args, Debug)]
pub struct TabArg {
    /// Use the workshop tab instead of the installed one.
    #[arg(long, short)]
    workshop: bool,
}

impl TabArg {
    const fn tab(&self) -> BrowseTab { if self.workshop { BrowseTab::Workshop } else { BrowseTab::Installed } }
}

/// Execute filter subcommands.
///
/// # Errors
///
/// Returns an error if Wallpaper Engine's document cannot be located, read or
/// written, or the filters are not a JSON object.
pub fn execute(custom_path: Option<&str>, cmd: &FiltersCommands) -> Result<(), WallpaperdError> {
    let config: Arc<dyn ConfigStore> = Arc::new(JsonConfigStore::from_override(custom_path)?);
    let document = EnginePlaylists::new(config).document()?;

    match cmd {
        FiltersCommands::Show { tab } => output::print_json(&document.filters(tab.tab())?),
        FiltersCommands::Set { tab, filters } => {
            let filters: Map<String, Value> = serde_json::from_str(filters)?;
            document.save_filters(tab.tab(), filters)?;
            output::print_success("Saved browser filters");
            Ok(())
        }
    }
}
