//! Wallpaper Engine playlist types.
//!
//! Wallpaper Engine itself is loose about the value types it writes for
//! playlist settings, so the boolean and delay fields accept several shapes.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::playlist_defaults;

/// Playlist behaviour settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSettings {
    /// Clock mode for time-of-day playlists.
    #[serde(default)]
    pub clock: String,
    /// Seconds between items. Zero applies a single item and stops.
    #[serde(default, deserialize_with = "lenient_delay")]
    pub delay: i64,
    /// Advance mode (`timer`, `dayandnight`, ...).
    #[serde(default)]
    pub mode: String,
    /// Item order (`random`, `sequential`).
    #[serde(default)]
    pub order: String,
    /// Fade between items.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub transition: bool,
    /// Advance while paused.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub updateonpause: bool,
    /// Play video wallpapers to the end before advancing.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub videosequence: bool,
}

/// A named, ordered list of wallpaper paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique name.
    #[serde(default)]
    pub name: String,
    /// Wallpaper paths, usually `.../431960/<id>/project.json`.
    #[serde(default)]
    pub items: Vec<String>,
    /// Behaviour settings.
    #[serde(default)]
    pub settings: PlaylistSettings,
}

impl Playlist {
    /// Creates an empty playlist with Wallpaper Engine's defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            settings: PlaylistSettings {
                delay: playlist_defaults::DELAY,
                mode: playlist_defaults::MODE.to_string(),
                order: playlist_defaults::ORDER.to_string(),
                ..PlaylistSettings::default()
            },
        }
    }
}

/// Interprets `value` as a boolean the way Wallpaper Engine's files need.
///
/// Strings are true unless they read `false`; numbers are true unless zero.
#[must_use]
pub fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.trim().eq_ignore_ascii_case("false"),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_bool(&Value::deserialize(deserializer)?))
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_delay<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n.trunc() as i64))
            .ok_or_else(|| de::Error::custom("delay out of range")),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(|n| n.trunc() as i64)
            .map_err(|_| de::Error::custom(format!("invalid delay: {text:?}"))),
        other => Err(de::Error::custom(format!("invalid delay: {other}"))),
    }
}
