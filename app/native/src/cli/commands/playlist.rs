//! Playlist CLI commands.
//!
//! Edits the playlists stored in Wallpaper Engine's own `config.json`.

use clap::Subcommand;
use tabled::Tabled;

use crate::cli::output;
use crate::error::WallpaperdError;
use crate::modules::playlist::Playlist;
use crate::service::WallpaperService;

/// Playlist management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum PlaylistCommands {
    /// List playlists.
    List {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Create an empty playlist with default settings.
    Create {
        /// Playlist name.
        name: String,
    },

    /// Rename a playlist.
    Rename {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },

    /// Delete a playlist.
    Delete {
        /// Playlist name.
        name: String,
    },

    /// Replace the wallpapers of a playlist.
    #[command(
        after_long_help = r"Examples:
  wallpaperd playlist set-items Evening \
    ~/.local/share/Steam/steamapps/workshop/content/431960/1234567/project.json"
    )]
    SetItems {
        /// Playlist name.
        name: String,
        /// Wallpaper paths, usually `.../431960/<id>/project.json`.
        items: Vec<String>,
    },
}

/// Execute playlist subcommands.
///
/// # Errors
///
/// Returns an error if the playlist document cannot be read or written, or
/// the named playlist is missing.
pub fn execute(service: &WallpaperService, cmd: &PlaylistCommands) -> Result<(), WallpaperdError> {
    match cmd {
        PlaylistCommands::List { json } => {
            let playlists = service.playlists()?;
            if *json {
                return output::print_json(&playlists);
            }
            output::print_table(
                "Playlists",
                playlists.iter().map(PlaylistRow::from).collect(),
                "No playlists found.",
            );
            Ok(())
        }
        PlaylistCommands::Create { name } => {
            let playlist = service.create_playlist(name)?;
            output::print_success(&format!("Created playlist '{}'", playlist.name));
            Ok(())
        }
        PlaylistCommands::Rename { old, new } => {
            service.rename_playlist(old, new)?;
            output::print_success(&format!("Renamed playlist '{old}' to '{}'", new.trim()));
            Ok(())
        }
        PlaylistCommands::Delete { name } => {
            service.delete_playlist(name)?;
            output::print_success(&format!("Deleted playlist '{name}'"));
            Ok(())
        }
        PlaylistCommands::SetItems { name, items } => {
            service.set_playlist_items(name, items.clone())?;
            output::print_success(&format!("Playlist '{name}' now has {} wallpapers", items.len()));
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct PlaylistRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Delay")]
    delay: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Order")]
    order: String,
}

impl From<&Playlist> for PlaylistRow {
    fn from(playlist: &Playlist) -> Self {
        Self {
            name: playlist.name.clone(),
            items: playlist.items.len(),
            delay: format!("{}s", playlist.settings.delay),
            mode: playlist.settings.mode.clone(),
            order: playlist.settings.order.clone(),
        }
    }
}
