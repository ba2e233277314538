//! Installed wallpaper library.
//!
//! Every folder in the workshop directory that holds a readable
//! `project.json` is one wallpaper, keyed by its folder name.

pub mod watcher;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub use watcher::{LibraryEvent, LibraryEventKind, LibraryWatcher};

use crate::config::ConfigError;
use crate::platform::path::existing_dir;

/// Name of the manifest inside each wallpaper folder.
pub const PROJECT_FILE: &str = "project.json";

/// Errors that can occur while reading the wallpaper library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The workshop directory could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The workshop directory could not be listed.
    #[error("failed to read wallpaper directory {}: {source}", path.display())]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// No wallpaper folder with this name exists.
    #[error("wallpaper '{0}' not found")]
    NotFound(String),

    /// A `project.json` could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Manifest path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A `project.json` is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The directory watcher could not be set up.
    #[error("failed to watch wallpaper directory: {0}")]
    Watch(#[from] notify::Error),
}

/// The subset of `project.json` the library exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Workshop description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Main file, relative to the wallpaper folder.
    #[serde(default)]
    pub file: String,
    /// Preview image, relative to the wallpaper folder.
    #[serde(default)]
    pub preview: String,
    /// Wallpaper kind (`scene`, `video`, `web`, ...).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Workshop tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Workshop item id. Some manifests store it as a number.
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "String::is_empty")]
    pub workshopid: String,
    /// Content rating (`Everyone`, `Questionable`, `Mature`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contentrating: String,
    /// Whether the item is approved on the workshop.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub approved: bool,
    /// The `general` section, properties included.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub general: Map<String, Value>,
}

/// One installed wallpaper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperEntry {
    /// Parsed manifest.
    pub project_data: ProjectData,
    /// `wallpaper://<absolute preview path>`, empty without a preview.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub preview_path: String,
}

/// Installed wallpapers keyed by folder name.
pub type WallpaperLibrary = BTreeMap<String, WallpaperEntry>;

/// Scans `dir` for wallpaper folders.
///
/// Folders without a readable, parseable manifest are skipped.
///
/// # Errors
///
/// Returns [`LibraryError::ReadDir`] if `dir` cannot be listed.
pub fn scan_workshop(dir: &Path) -> Result<WallpaperLibrary, LibraryError> {
    let folders: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| LibraryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .map(|entry| entry.path())
        .collect();

    let library: WallpaperLibrary = folders
        .par_iter()
        .filter_map(|folder| {
            let name = folder.file_name()?.to_string_lossy().into_owned();
            match read_entry(folder) {
                Ok(entry) => Some((name, entry)),
                Err(err) => {
                    tracing::trace!(folder = %name, error = %err, "skipping wallpaper folder");
                    None
                }
            }
        })
        .collect();

    tracing::debug!(dir = %dir.display(), wallpapers = library.len(), "scanned wallpaper library");
    Ok(library)
}

fn read_entry(folder: &Path) -> Result<WallpaperEntry, LibraryError> {
    let project_data: ProjectData = serde_json::from_value(read_manifest(folder)?).map_err(|source| {
        LibraryError::Parse {
            path: folder.join(PROJECT_FILE),
            source,
        }
    })?;

    let preview_path = if project_data.preview.is_empty() {
        String::new()
    } else {
        format!("wallpaper://{}", folder.join(&project_data.preview).display())
    };

    Ok(WallpaperEntry {
        project_data,
        preview_path,
    })
}

fn read_manifest(folder: &Path) -> Result<Value, LibraryError> {
    let path = folder.join(PROJECT_FILE);
    let content = fs::read_to_string(&path).map_err(|source| LibraryError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LibraryError::Parse { path, source })
}

/// Returns the user-tweakable properties of wallpaper `id`.
///
/// Properties come from `general.properties`, or a top-level `properties`
/// when there is no `general` section. A top-level `schemecolor` string is
/// added as a color property unless one already exists.
///
/// # Errors
///
/// Returns [`LibraryError::NotFound`] if the folder does not exist, or an
/// IO or parse error for its manifest.
pub fn wallpaper_properties(dir: &Path, id: &str) -> Result<Map<String, Value>, LibraryError> {
    let folder = existing_dir(dir, id).ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
    let manifest = read_manifest(&folder)?;

    let section = match manifest.get("general") {
        Some(Value::Object(general)) => general.get("properties"),
        _ => manifest.get("properties"),
    };
    let mut properties = match section {
        Some(Value::Object(properties)) => properties.clone(),
        _ => Map::new(),
    };

    if let Some(Value::String(scheme)) = manifest.get("schemecolor") {
        properties.entry("schemecolor").or_insert_with(|| {
            json!({
                "type": "color",
                "text": "Theme Color",
                "value": scheme,
                "order": -1,
            })
        });
    }

    Ok(properties)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_project(dir: &Path, id: &str, manifest: &Value) {
        let folder = dir.join(id);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(PROJECT_FILE), manifest.to_string()).unwrap();
    }

    #[test]
    fn test_scan_skips_invalid_folders() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "100", &json!({
            "title": "Rain",
            "file": "scene.pkg",
            "preview": "preview.gif",
            "type": "scene",
            "tags": ["Nature"],
            "workshopid": 100
        }));
        fs::create_dir(dir.path().join("200")).unwrap();
        fs::create_dir(dir.path().join("300")).unwrap();
        fs::write(dir.path().join("300").join(PROJECT_FILE), "{ not json").unwrap();
        fs::write(dir.path().join("stray.txt"), "").unwrap();

        let library = scan_workshop(dir.path()).unwrap();
        assert_eq!(library.keys().collect::<Vec<_>>(), vec!["100"]);

        let entry = &library["100"];
        assert_eq!(entry.project_data.title, "Rain");
        assert_eq!(entry.project_data.kind, "scene");
        assert_eq!(entry.project_data.workshopid, "100");
        assert_eq!(
            entry.preview_path,
            format!("wallpaper://{}", dir.path().join("100").join("preview.gif").display())
        );
    }

    #[test]
    fn test_scan_without_preview() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "7", &json!({"title": "Plain", "type": "video"}));

        let library = scan_workshop(dir.path()).unwrap();
        assert!(library["7"].preview_path.is_empty());
        let value = serde_json::to_value(&library["7"]).unwrap();
        assert!(value.get("previewPath").is_none());
        assert_eq!(value["projectData"]["type"], json!("video"));
    }

    #[test]
    fn test_scan_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = scan_workshop(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LibraryError::ReadDir { .. }));
    }

    #[test]
    fn test_properties_from_general() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "42", &json!({
            "general": {
                "properties": {
                    "speed": {"type": "slider", "value": 1.5}
                }
            },
            "schemecolor": "0.1 0.2 0.3"
        }));

        let properties = wallpaper_properties(dir.path(), "42").unwrap();
        assert_eq!(properties["speed"]["type"], json!("slider"));
        assert_eq!(properties["schemecolor"], json!({
            "type": "color",
            "text": "Theme Color",
            "value": "0.1 0.2 0.3",
            "order": -1
        }));
    }

    #[test]
    fn test_properties_keep_existing_schemecolor() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "42", &json!({
            "properties": {
                "schemecolor": {"type": "color", "value": "1 1 1"}
            },
            "schemecolor": "0 0 0"
        }));

        let properties = wallpaper_properties(dir.path(), "42").unwrap();
        assert_eq!(properties["schemecolor"]["value"], json!("1 1 1"));
    }

    #[test]
    fn test_properties_unknown_wallpaper() {
        let dir = TempDir::new().unwrap();
        let err = wallpaper_properties(dir.path(), "999").unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(id) if id == "999"));
    }
}
