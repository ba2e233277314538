//! Error types for playlists and cycling sessions.
//!
//! # Error Categories
//!
//! - **Selection errors**: nothing configured, unknown playlist, nothing to cycle
//! - **Session errors**: no session, session gone, control message timed out
//! - **Document errors**: Wallpaper Engine's `config.json` missing or unreadable

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::error::WallpaperdError;

/// Result type alias for playlist operations.
pub type PlaylistResult<T> = Result<T, PlaylistError>;

/// Errors that can occur during playlist management and cycling.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// The configuration has no `playlist` selected.
    #[error("no playlist configured")]
    NoPlaylistConfigured,

    /// No playlist with this name exists.
    #[error("playlist '{0}' not found")]
    NotFound(String),

    /// A playlist with this name already exists.
    #[error("playlist '{0}' already exists")]
    AlreadyExists(String),

    /// Playlist names must not be blank.
    #[error("playlist name cannot be empty")]
    EmptyName,

    /// The playlist has no items.
    #[error("playlist '{0}' has no wallpapers")]
    Empty(String),

    /// None of the playlist items point into the workshop directory.
    #[error("no valid wallpapers found in playlist '{0}'")]
    NoCandidates(String),

    /// The target screen has no entry in the configuration.
    #[error("screen '{0}' not found in config")]
    ScreenNotFound(String),

    /// No cycling session exists for the screen.
    #[error("no playlist is currently running for screen {0}")]
    NotRunning(String),

    /// The session did not accept a control message in time.
    #[error("timeout sending interval update to screen {0}")]
    Timeout(String),

    /// The session's actor has already exited.
    #[error("playlist session for screen {0} has shut down")]
    SessionClosed(String),

    /// The daemon configuration could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Wallpaper Engine's `config.json` does not exist.
    #[error("wallpaper_engine config.json not found at {}", .0.display())]
    DocumentMissing(PathBuf),

    /// The install directory could not be derived from the workshop path.
    #[error("could not determine wallpaper_engine installation path from {}", .0.display())]
    UnknownInstallPath(PathBuf),

    /// Reading or writing Wallpaper Engine's `config.json` failed.
    #[error("failed to access wallpaper_engine config.json: {0}")]
    Io(#[from] std::io::Error),

    /// Wallpaper Engine's `config.json` is not valid JSON.
    #[error("failed to parse wallpaper_engine config.json: {0}")]
    Parse(#[from] serde_json::Error),

    /// Wallpaper Engine's `config.json` is valid JSON but not an object.
    #[error("wallpaper_engine config.json is not a JSON object")]
    MalformedDocument,

    /// Re-applying wallpapers after a selection failed.
    #[error("failed to apply wallpapers: {0}")]
    Apply(WallpaperdError),
}
