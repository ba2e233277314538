//! Playlist management and cycling.
//!
//! Playlists live in Wallpaper Engine's own `config.json`, under
//! `steamuser.general.playlists`. [`EnginePlaylists`] edits them in place and
//! [`Scheduler`] cycles through one per screen on a timer.

pub mod error;
pub mod ids;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

pub use error::{PlaylistError, PlaylistResult};
pub use ids::extract_wallpaper_ids;
pub use scheduler::{Scheduler, SessionStatus};
pub use session::{SessionCommand, cycle_interval, interval_from_minutes};
pub use store::{
    BrowseTab, EngineConfigStore, EnginePlaylists, MemoryPlaylists, PlaylistSource, engine_config_path,
};
pub use types::{Playlist, PlaylistSettings};
