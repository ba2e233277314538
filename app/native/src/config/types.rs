//! Configuration types for wallpaperd.
//!
//! The configuration file is shared with the GUI front-end. Field names match
//! the JSON keys the GUI writes, and keys this daemon does not know about are
//! kept in [`AppConfig::extra`] so a write never drops them.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Per-screen wallpaper assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreenConfig {
    /// Output name as reported by the display server (e.g. `DP-1`).
    #[serde(default)]
    pub name: String,

    /// Wallpaper folder name or path rendered on this screen.
    #[serde(default)]
    pub wallpaper: Option<String>,

    /// Playlist that last assigned this screen's wallpaper.
    #[serde(default)]
    pub playlist: String,

    /// Cycle interval in minutes of that playlist.
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub playlist_interval: f64,
}

impl ScreenConfig {
    /// Creates an entry for a screen with an optional wallpaper.
    #[must_use]
    pub fn new(name: impl Into<String>, wallpaper: Option<String>) -> Self {
        Self {
            name: name.into(),
            wallpaper,
            ..Self::default()
        }
    }
}

/// The `playlist` key.
///
/// Current GUIs store the name of the Wallpaper Engine playlist selected for
/// cycling. Older ones store a list of playlists that is passed to the
/// renderer as `--playlist` arguments. Both shapes are read and written back
/// as they were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PlaylistSelection {
    /// Playlist cycled by the scheduler.
    Name(String),
    /// Renderer `--playlist` arguments. Nothing is selected for cycling.
    Args(Vec<String>),
}

impl Default for PlaylistSelection {
    fn default() -> Self { Self::Name(String::new()) }
}

impl From<&str> for PlaylistSelection {
    fn from(name: &str) -> Self { Self::Name(name.to_string()) }
}

/// Daemon configuration.
///
/// Renderer flags map one to one onto `linux-wallpaperengine` arguments; the
/// remaining fields describe screens and where to find things on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Target frame rate. Zero means the renderer default of 60.
    #[serde(rename = "FPS", default, skip_serializing_if = "is_zero_u32")]
    pub fps: u32,

    /// Mute all audio.
    #[serde(rename = "SILENCE", default)]
    pub silence: bool,

    /// Keep audio playing when other applications produce sound.
    #[serde(default)]
    pub no_automute: bool,

    /// Disable audio-reactive processing.
    #[serde(default)]
    pub no_audio_processing: bool,

    /// Keep rendering and cycling while a fullscreen window is focused.
    #[serde(default)]
    pub no_fullscreen_pause: bool,

    /// Disable particle systems.
    #[serde(default)]
    pub disable_particles: bool,

    /// Ask the renderer to dump the scene structure.
    #[serde(default)]
    pub dump_structure: bool,

    /// Scaling mode (`stretch`, `fit`, `fill`, `default`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scaling: String,

    /// Texture clamping mode.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub clamping: String,

    /// Playlist selected for cycling, or renderer `--playlist` arguments.
    #[serde(default)]
    pub playlist: PlaylistSelection,

    /// Interval in minutes of the selected playlist.
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub playlist_interval: f64,

    /// Audio volume, truncated to an integer on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    /// Ignore mouse input.
    #[serde(default)]
    pub disable_mouse: bool,

    /// Disable the parallax effect.
    #[serde(default)]
    pub disable_parallax: bool,

    /// Pause only for the active fullscreen window.
    #[serde(default)]
    pub fullscreen_pause_only_active: bool,

    /// Application ids that never trigger a fullscreen pause.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fullscreen_pause_ignore_app_ids: Vec<String>,

    /// Properties applied to wallpapers with no entry in `wallpaperProperties`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,

    /// Properties per wallpaper.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub wallpaper_properties: BTreeMap<String, BTreeMap<String, String>>,

    /// Raw arguments appended to every renderer command.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_args: String,

    /// Whether `customArgs` is appended.
    #[serde(default)]
    pub custom_args_enabled: bool,

    /// Screenshot output path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub screenshot: String,

    /// Seconds to wait before taking the screenshot.
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub screenshot_delay: i64,

    /// Custom assets directory.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assets_dir: String,

    /// Known screens, connected or not.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screens: Vec<ScreenConfig>,

    /// Render `globalWallpaper` on every screen.
    #[serde(default, skip_serializing_if = "is_false")]
    pub clone_mode: bool,

    /// Wallpaper used on every screen in clone mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_wallpaper: Option<String>,

    /// Renderer executable. Empty means `linux-wallpaperengine` from `PATH`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_executable_location: String,

    /// Workshop content directory override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub wallpaper_engine_dir: String,

    /// Keys owned by the GUI.
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

impl Default for AppConfig {
    /// Values the GUI starts from when no configuration file exists.
    fn default() -> Self {
        Self {
            fps: 60,
            silence: false,
            no_automute: false,
            no_audio_processing: false,
            no_fullscreen_pause: false,
            disable_particles: false,
            dump_structure: false,
            scaling: "default".to_string(),
            clamping: "clamp".to_string(),
            playlist: PlaylistSelection::default(),
            playlist_interval: 0.0,
            volume: Some(100.0),
            disable_mouse: false,
            disable_parallax: false,
            fullscreen_pause_only_active: false,
            fullscreen_pause_ignore_app_ids: Vec::new(),
            properties: BTreeMap::new(),
            wallpaper_properties: BTreeMap::new(),
            custom_args: String::new(),
            custom_args_enabled: false,
            screenshot: String::new(),
            screenshot_delay: 5,
            assets_dir: String::new(),
            screens: Vec::new(),
            clone_mode: false,
            global_wallpaper: None,
            custom_executable_location: String::new(),
            wallpaper_engine_dir: String::new(),
            extra: Map::new(),
        }
    }
}

impl AppConfig {
    /// Returns the configured entry for `name`, first match wins.
    #[must_use]
    pub fn screen(&self, name: &str) -> Option<&ScreenConfig> {
        self.screens.iter().find(|screen| screen.name == name)
    }

    /// Mutable variant of [`Self::screen`].
    pub fn screen_mut(&mut self, name: &str) -> Option<&mut ScreenConfig> {
        self.screens.iter_mut().find(|screen| screen.name == name)
    }

    /// Name of the playlist selected for cycling, empty when none is.
    #[must_use]
    pub fn selected_playlist(&self) -> &str {
        match &self.playlist {
            PlaylistSelection::Name(name) => name,
            PlaylistSelection::Args(_) => "",
        }
    }

    /// Extra `--playlist` arguments for the renderer.
    #[must_use]
    pub fn playlist_args(&self) -> &[String] {
        match &self.playlist {
            PlaylistSelection::Name(_) => &[],
            PlaylistSelection::Args(args) => args,
        }
    }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read or written.
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    /// No home or config directory could be determined.
    #[error("Could not determine the {0} directory")]
    MissingDirectory(&'static str),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_u32(value: &u32) -> bool { *value == 0 }

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_i64(value: &i64) -> bool { *value == 0 }

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_f64(value: &f64) -> bool { *value == 0.0 }

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool { !*value }
