//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file commands
//! - `daemon` - The long-running daemon
//! - `filters` - Wallpaper browser filter commands
//! - `playlist` - Playlist management commands

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use serde::Serialize;
use tabled::Tabled;

use super::output;
use crate::constants::APP_NAME;
use crate::error::WallpaperdError;
use crate::modules::library;
use crate::schema;
use crate::service::WallpaperService;

pub mod config_cmd;
pub mod daemon;
pub mod filters;
pub mod playlist;

pub use config_cmd::ConfigCommands;
pub use filters::FiltersCommands;
pub use playlist::PlaylistCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// wallpaperd - renderer supervisor and playlist scheduler for linux-wallpaperengine.
#[derive(Parser, Debug)]
#[command(name = "wallpaperd")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Defaults to `$XDG_CONFIG_HOME/linux-wallpaperengine-gui/config.json`.
    #[arg(long, short, global = true, value_name = "PATH", env = "WALLPAPERD_CONFIG")]
    pub config: Option<String>,

    /// Log at debug level. `RUST_LOG` overrides this.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the daemon (the default).
    ///
    /// Applies the configured wallpapers, re-applies them when displays change,
    /// and pauses playlist cycling while a fullscreen window is focused.
    Daemon {
        /// Start cycling the selected playlist on this screen. Repeatable.
        /// Use `Global` for clone mode.
        #[arg(long, value_name = "SCREEN")]
        cycle: Vec<String>,
    },

    /// Stop every running linux-wallpaperengine process.
    KillAll,

    /// List connected and configured screens.
    Screens {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// List installed wallpapers.
    Wallpapers {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Print the user-tweakable properties of a wallpaper as JSON.
    Properties {
        /// Workshop folder name of the wallpaper.
        id: String,
    },

    /// Wallpaper Engine playlist commands.
    #[command(subcommand)]
    Playlist(PlaylistCommands),

    /// Wallpaper Engine browser filter commands.
    #[command(subcommand)]
    Filters(FiltersCommands),

    /// Configuration file commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(wallpaperd completions --shell zsh)"
    ///   wallpaperd completions --shell fish > ~/.config/fish/completions/wallpaperd.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), WallpaperdError> {
        let config = self.config.as_deref();

        match &self.command {
            None => daemon::execute(config, &[]),
            Some(Commands::Daemon { cycle }) => daemon::execute(config, cycle),
            Some(Commands::KillAll) => {
                let count = WallpaperService::system(config)?.kill_all_wallpapers()?;
                output::print_success(&format!("Stopped all renderers ({count} tracked)"));
                Ok(())
            }
            Some(Commands::Screens { json }) => print_screens(&WallpaperService::system(config)?, *json),
            Some(Commands::Wallpapers { json }) => {
                print_wallpapers(&WallpaperService::system(config)?, *json)
            }
            Some(Commands::Properties { id }) => {
                output::print_json(&WallpaperService::system(config)?.wallpaper_properties(id)?)
            }
            Some(Commands::Playlist(cmd)) => playlist::execute(&WallpaperService::system(config)?, cmd),
            Some(Commands::Filters(cmd)) => filters::execute(config, cmd),
            Some(Commands::Config(cmd)) => config_cmd::execute(config, cmd),
            Some(Commands::Schema) => {
                println!("{}", schema::print_schema());
                Ok(())
            }
            Some(Commands::Completions { shell }) => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct ScreenRow {
    #[tabled(rename = "Screen")]
    name: String,
    #[tabled(rename = "Connected", display = "connected_mark")]
    connected: bool,
    #[tabled(rename = "Wallpaper")]
    wallpaper: String,
    #[tabled(rename = "Playlist")]
    playlist: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn connected_mark(connected: &bool) -> String { output::format_bool(*connected) }

/// Lists connected screens first, then configured but disconnected ones.
fn print_screens(service: &WallpaperService, json: bool) -> Result<(), WallpaperdError> {
    let config = service.config().read()?;
    let connected = service.screens()?;

    let mut rows: Vec<ScreenRow> = connected
        .iter()
        .map(|name| {
            let screen = config.screen(name);
            ScreenRow {
                name: name.clone(),
                connected: true,
                wallpaper: screen.and_then(|s| s.wallpaper.clone()).unwrap_or_default(),
                playlist: screen.map(|s| s.playlist.clone()).unwrap_or_default(),
            }
        })
        .collect();
    rows.extend(config.screens.iter().filter(|s| !connected.contains(&s.name)).map(|s| ScreenRow {
        name: s.name.clone(),
        connected: false,
        wallpaper: s.wallpaper.clone().unwrap_or_default(),
        playlist: s.playlist.clone(),
    }));

    if json {
        return output::print_json(&rows);
    }
    output::print_table("Screens", rows, "No screens detected.");
    Ok(())
}

#[derive(Tabled)]
struct WallpaperRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

fn print_wallpapers(service: &WallpaperService, json: bool) -> Result<(), WallpaperdError> {
    let wallpapers = library::scan_workshop(&service.workshop_dir()?)?;

    if json {
        return output::print_json(&wallpapers);
    }

    let rows = wallpapers
        .into_iter()
        .map(|(id, entry)| WallpaperRow {
            id,
            title: output::truncate(&entry.project_data.title, 40),
            kind: entry.project_data.kind,
            tags: entry.project_data.tags.join(", "),
        })
        .collect();
    output::print_table("Wallpapers", rows, "No wallpapers installed.");
    Ok(())
}
