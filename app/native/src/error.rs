//! Error types for wallpaperd.
//!
//! Every subsystem reports failures through its own `thiserror` enum. They all
//! fold into [`WallpaperdError`], which is what the service layer returns and
//! what a request layer serializes back to its caller.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::library::LibraryError;
use crate::modules::playlist::PlaylistError;
use crate::platform::display::DisplayError;

/// Errors returned by service operations.
///
/// Serializes as `{ "kind": "...", "message": "..." }`.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum WallpaperdError {
    /// Reading or writing the daemon configuration failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// A playlist lookup, document update or session operation failed.
    #[error("Playlist error: {0}")]
    PlaylistError(String),
    /// Display enumeration failed.
    #[error("Display error: {0}")]
    DisplayError(String),
    /// Scanning the wallpaper library failed.
    #[error("Library error: {0}")]
    LibraryError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<ConfigError> for WallpaperdError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<PlaylistError> for WallpaperdError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::Config(inner) => inner.into(),
            PlaylistError::Apply(inner) => inner,
            other => Self::PlaylistError(other.to_string()),
        }
    }
}

impl From<DisplayError> for WallpaperdError {
    fn from(err: DisplayError) -> Self { Self::DisplayError(err.to_string()) }
}

impl From<LibraryError> for WallpaperdError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Config(inner) => inner.into(),
            other => Self::LibraryError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for WallpaperdError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for WallpaperdError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}
