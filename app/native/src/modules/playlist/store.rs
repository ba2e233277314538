//! Playlist storage.
//!
//! Playlists belong to Wallpaper Engine and live in its `config.json` under
//! `steamuser.general.playlists`. The document is edited as a generic JSON
//! tree so every other setting Wallpaper Engine keeps there survives a save.
//! The browser's saved filters under `steamuser.general.browser.filterinfo`
//! are edited the same way.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use tempfile::NamedTempFile;

use super::error::{PlaylistError, PlaylistResult};
use super::types::Playlist;
use crate::config::{self, ConfigStore};
use crate::constants::{ENGINE_INSTALL_SUFFIX, WORKSHOP_SUFFIX};

/// Access to the playlist collection.
///
/// Implementors provide load and save; the editing operations are shared.
pub trait PlaylistSource: Send + Sync {
    /// Loads all playlists in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing document cannot be read.
    fn playlists(&self) -> PlaylistResult<Vec<Playlist>>;

    /// Replaces all playlists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing document cannot be written.
    fn save_playlists(&self, playlists: &[Playlist]) -> PlaylistResult<()>;

    /// Returns the playlist called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::NotFound`] if it does not exist.
    fn find(&self, name: &str) -> PlaylistResult<Playlist> {
        self.playlists()?
            .into_iter()
            .find(|playlist| playlist.name == name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))
    }

    /// Creates an empty playlist with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or taken, or the save fails.
    fn create(&self, name: &str) -> PlaylistResult<Playlist> {
        let name = validate_name(name)?;
        let mut playlists = self.playlists()?;
        if playlists.iter().any(|playlist| playlist.name == name) {
            return Err(PlaylistError::AlreadyExists(name.to_string()));
        }

        let playlist = Playlist::new(name);
        playlists.push(playlist.clone());
        self.save_playlists(&playlists)?;
        Ok(playlist)
    }

    /// Renames a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if `old` does not exist, `new` is blank or taken, or
    /// the save fails.
    fn rename(&self, old: &str, new: &str) -> PlaylistResult<()> {
        let new = validate_name(new)?;
        let mut playlists = self.playlists()?;
        if old != new && playlists.iter().any(|playlist| playlist.name == new) {
            return Err(PlaylistError::AlreadyExists(new.to_string()));
        }

        let playlist = find_mut(&mut playlists, old)?;
        playlist.name = new.to_string();
        self.save_playlists(&playlists)
    }

    /// Deletes a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or the save fails.
    fn delete(&self, name: &str) -> PlaylistResult<()> {
        let mut playlists = self.playlists()?;
        let before = playlists.len();
        playlists.retain(|playlist| playlist.name != name);
        if playlists.len() == before {
            return Err(PlaylistError::NotFound(name.to_string()));
        }
        self.save_playlists(&playlists)
    }

    /// Replaces the items of a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or the save fails.
    fn set_items(&self, name: &str, items: Vec<String>) -> PlaylistResult<()> {
        let mut playlists = self.playlists()?;
        find_mut(&mut playlists, name)?.items = items;
        self.save_playlists(&playlists)
    }

    /// Stores a new interval, given in minutes, as the playlist delay in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist or the save fails.
    fn set_interval(&self, name: &str, minutes: f64) -> PlaylistResult<()> {
        let mut playlists = self.playlists()?;
        #[allow(clippy::cast_possible_truncation)]
        let delay = (minutes * 60.0) as i64;
        find_mut(&mut playlists, name)?.settings.delay = delay;
        self.save_playlists(&playlists)
    }
}

fn validate_name(name: &str) -> PlaylistResult<&str> {
    let name = name.trim();
    if name.is_empty() { Err(PlaylistError::EmptyName) } else { Ok(name) }
}

fn find_mut<'a>(playlists: &'a mut [Playlist], name: &str) -> PlaylistResult<&'a mut Playlist> {
    playlists
        .iter_mut()
        .find(|playlist| playlist.name == name)
        .ok_or_else(|| PlaylistError::NotFound(name.to_string()))
}

/// Derives Wallpaper Engine's `config.json` path from the workshop directory.
///
/// `.../steamapps/workshop/content/431960` maps to
/// `.../steamapps/common/wallpaper_engine/config.json`.
#[must_use]
pub fn engine_config_path(workshop: &Path) -> Option<PathBuf> {
    let workshop = workshop.to_str()?.trim_end_matches('/');
    let install = workshop.strip_suffix(WORKSHOP_SUFFIX)?;
    Some(PathBuf::from(format!("{install}{ENGINE_INSTALL_SUFFIX}")).join("config.json"))
}

/// Playlists in a Wallpaper Engine `config.json` at a fixed path.
#[derive(Debug, Clone)]
pub struct EngineConfigStore {
    path: PathBuf,
}

impl EngineConfigStore {
    /// Creates a store for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Path of the document.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    fn load(&self) -> PlaylistResult<Value> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlaylistError::DocumentMissing(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn store(&self, root: &Value) -> PlaylistResult<()> {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
        root.serialize(&mut serializer)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&buffer)?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl PlaylistSource for EngineConfigStore {
    fn playlists(&self) -> PlaylistResult<Vec<Playlist>> {
        let root = self.load()?;
        match root.pointer("/steamuser/general/playlists") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(playlists) => Ok(Vec::<Playlist>::deserialize(playlists)?),
        }
    }

    fn save_playlists(&self, playlists: &[Playlist]) -> PlaylistResult<()> {
        let mut root = self.load()?;
        let document = root.as_object_mut().ok_or(PlaylistError::MalformedDocument)?;

        section(document, &["steamuser", "general"])
            .insert("playlists".to_string(), serde_json::to_value(playlists)?);

        self.store(&root)
    }
}

/// A tab of Wallpaper Engine's wallpaper browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseTab {
    /// Wallpapers already on disk.
    Installed,
    /// The Steam Workshop listing.
    Workshop,
}

impl BrowseTab {
    const fn key(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Workshop => "workshop",
        }
    }
}

impl EngineConfigStore {
    /// Saved browser filters for `tab`. Empty when none were saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    pub fn filters(&self, tab: BrowseTab) -> PlaylistResult<Map<String, Value>> {
        let root = self.load()?;
        match root.pointer(&format!("/steamuser/general/browser/filterinfo/{}", tab.key())) {
            Some(Value::Object(filters)) => Ok(filters.clone()),
            _ => Ok(Map::new()),
        }
    }

    /// Replaces the saved browser filters for `tab`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, is not an object, or
    /// cannot be written.
    pub fn save_filters(&self, tab: BrowseTab, filters: Map<String, Value>) -> PlaylistResult<()> {
        let mut root = self.load()?;
        let document = root.as_object_mut().ok_or(PlaylistError::MalformedDocument)?;

        section(document, &["steamuser", "general", "browser", "filterinfo"])
            .insert(tab.key().to_string(), Value::Object(filters));

        self.store(&root)
    }
}

/// Walks `path` down from `document`, replacing anything that is not an object.
fn section<'a>(document: &'a mut Map<String, Value>, path: &[&str]) -> &'a mut Map<String, Value> {
    path.iter().fold(document, |map, key| ensure_object(map.entry(*key).or_insert(Value::Null)))
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            ensure_object(other)
        }
    }
}

/// Playlists in the Wallpaper Engine install that the configuration points at.
///
/// The document path is resolved on every call so a changed
/// `wallpaperEngineDir` takes effect without a restart.
pub struct EnginePlaylists {
    config: Arc<dyn ConfigStore>,
}

impl EnginePlaylists {
    /// Creates a source that follows `config`.
    pub fn new(config: Arc<dyn ConfigStore>) -> Self { Self { config } }

    /// Resolves the current document.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the install
    /// path cannot be derived.
    pub fn document(&self) -> PlaylistResult<EngineConfigStore> {
        let config = self.config.read()?;
        let workshop = config::workshop_dir(&config)?;
        engine_config_path(&workshop)
            .map(EngineConfigStore::new)
            .ok_or(PlaylistError::UnknownInstallPath(workshop))
    }
}

impl PlaylistSource for EnginePlaylists {
    fn playlists(&self) -> PlaylistResult<Vec<Playlist>> { self.document()?.playlists() }

    fn save_playlists(&self, playlists: &[Playlist]) -> PlaylistResult<()> {
        self.document()?.save_playlists(playlists)
    }
}

/// Playlists held in memory.
#[derive(Debug, Default)]
pub struct MemoryPlaylists {
    playlists: Mutex<Vec<Playlist>>,
}

impl MemoryPlaylists {
    /// Creates a source holding `playlists`.
    #[must_use]
    pub fn new(playlists: Vec<Playlist>) -> Self {
        Self {
            playlists: Mutex::new(playlists),
        }
    }
}

impl PlaylistSource for MemoryPlaylists {
    fn playlists(&self) -> PlaylistResult<Vec<Playlist>> { Ok(self.playlists.lock().clone()) }

    fn save_playlists(&self, playlists: &[Playlist]) -> PlaylistResult<()> {
        *self.playlists.lock() = playlists.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::config::{AppConfig, MemoryConfigStore};

    fn write_document(dir: &TempDir, value: &Value) -> EngineConfigStore {
        let path = dir.path().join("config.json");
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        EngineConfigStore::new(path)
    }

    #[test]
    fn test_engine_config_path() {
        assert_eq!(
            engine_config_path(Path::new("/home/u/.local/share/Steam/steamapps/workshop/content/431960")),
            Some(PathBuf::from("/home/u/.local/share/Steam/steamapps/common/wallpaper_engine/config.json"))
        );
        assert_eq!(
            engine_config_path(Path::new("/mnt/lib/steamapps/workshop/content/431960/")),
            Some(PathBuf::from("/mnt/lib/steamapps/common/wallpaper_engine/config.json"))
        );
        assert_eq!(engine_config_path(Path::new("/data/wallpapers")), None);
    }

    #[test]
    fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = EngineConfigStore::new(dir.path().join("config.json"));
        assert!(matches!(store.playlists(), Err(PlaylistError::DocumentMissing(_))));
    }

    #[test]
    fn test_reads_playlists() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({
            "steamuser": {"general": {"playlists": [
                {"name": "Chill", "items": ["a/431960/1/p.json"], "settings": {"delay": 300, "transition": "true"}}
            ]}}
        }));

        let playlists = store.playlists().unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].settings.delay, 300);
        assert!(playlists[0].settings.transition);
    }

    #[test]
    fn test_document_without_playlists_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({"steamuser": {}}));
        assert!(store.playlists().unwrap().is_empty());
    }

    #[test]
    fn test_save_keeps_unrelated_fields_and_order() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({
            "version": 3,
            "steamuser": {
                "general": {
                    "browser": {"filterinfo": {"installed": {"sort": "name"}}},
                    "playlists": [],
                    "zoom": 1.5
                },
                "wallpaperconfig": {"selectedwallpapers": {}}
            },
            "aaa": true
        }));

        store.create("Night").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n\t\"version\": 3"));
        let root: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = root.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["version", "steamuser", "aaa"]);
        assert_eq!(root["steamuser"]["general"]["browser"]["filterinfo"]["installed"]["sort"], "name");
        assert_eq!(root["steamuser"]["general"]["zoom"], 1.5);
        assert_eq!(root["steamuser"]["wallpaperconfig"], json!({"selectedwallpapers": {}}));
        assert_eq!(root["steamuser"]["general"]["playlists"][0]["name"], "Night");
        assert_eq!(root["steamuser"]["general"]["playlists"][0]["settings"]["mode"], "timer");
    }

    #[test]
    fn test_save_creates_missing_sections() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({"other": 1}));
        store.create("First").unwrap();

        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(root["other"], 1);
        assert_eq!(root["steamuser"]["general"]["playlists"][0]["name"], "First");
    }

    #[test]
    fn test_save_replaces_non_object_sections() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({"steamuser": {"general": "broken", "keep": true}}));
        store.create("First").unwrap();

        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(root["steamuser"]["keep"], true);
        assert_eq!(root["steamuser"]["general"]["playlists"][0]["name"], "First");

        let mut value = json!(null);
        ensure_object(&mut value).insert("a".to_string(), json!(1));
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_filters_round_trip_per_tab() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({
            "steamuser": {"general": {"browser": {"filterinfo": {"installed": {"type": ["scene"]}}, "zoom": 2}}}
        }));

        assert_eq!(store.filters(BrowseTab::Installed).unwrap()["type"], json!(["scene"]));
        assert!(store.filters(BrowseTab::Workshop).unwrap().is_empty());

        let mut filters = Map::new();
        filters.insert("rating".to_string(), json!({"everyone": true}));
        store.save_filters(BrowseTab::Workshop, filters).unwrap();

        assert_eq!(store.filters(BrowseTab::Workshop).unwrap()["rating"]["everyone"], true);
        assert_eq!(store.filters(BrowseTab::Installed).unwrap()["type"], json!(["scene"]));
        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(root["steamuser"]["general"]["browser"]["zoom"], 2);
    }

    #[test]
    fn test_save_filters_creates_sections() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!({}));
        store.save_filters(BrowseTab::Installed, Map::new()).unwrap();

        let root: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(root["steamuser"]["general"]["browser"]["filterinfo"]["installed"].is_object());
    }

    #[test]
    fn test_save_rejects_non_object_document() {
        let dir = TempDir::new().unwrap();
        let store = write_document(&dir, &json!([1, 2]));
        assert!(matches!(store.save_playlists(&[]), Err(PlaylistError::MalformedDocument)));
    }

    #[test]
    fn test_crud() {
        let source = MemoryPlaylists::default();
        source.create("A").unwrap();
        assert!(matches!(source.create("A"), Err(PlaylistError::AlreadyExists(_))));
        assert!(matches!(source.create("  "), Err(PlaylistError::EmptyName)));

        source.set_items("A", vec!["x/431960/5/p.json".to_string()]).unwrap();
        source.rename("A", "B").unwrap();
        assert!(matches!(source.find("A"), Err(PlaylistError::NotFound(_))));
        assert_eq!(source.find("B").unwrap().items.len(), 1);

        source.set_interval("B", 2.5).unwrap();
        assert_eq!(source.find("B").unwrap().settings.delay, 150);

        source.delete("B").unwrap();
        assert!(matches!(source.delete("B"), Err(PlaylistError::NotFound(_))));
        assert!(source.playlists().unwrap().is_empty());
    }

    #[test]
    fn test_rename_to_existing_name_fails() {
        let source = MemoryPlaylists::new(vec![Playlist::new("A"), Playlist::new("B")]);
        assert!(matches!(source.rename("A", "B"), Err(PlaylistError::AlreadyExists(_))));
    }

    #[test]
    fn test_engine_playlists_follow_configured_dir() {
        let steam = TempDir::new().unwrap();
        let workshop = steam.path().join(WORKSHOP_SUFFIX);
        let install = steam.path().join(ENGINE_INSTALL_SUFFIX);
        fs::create_dir_all(&workshop).unwrap();
        fs::create_dir_all(&install).unwrap();
        fs::write(install.join("config.json"), "{}").unwrap();

        let config = AppConfig {
            wallpaper_engine_dir: workshop.to_string_lossy().into_owned(),
            ..AppConfig::default()
        };
        let source = EnginePlaylists::new(Arc::new(MemoryConfigStore::new(config)));
        source.create("Morning").unwrap();

        assert_eq!(source.playlists().unwrap()[0].name, "Morning");
        assert_eq!(source.document().unwrap().path(), install.join("config.json"));
    }

    #[test]
    fn test_engine_playlists_unknown_install() {
        let config = AppConfig {
            wallpaper_engine_dir: "/data/wallpapers".to_string(),
            ..AppConfig::default()
        };
        let source = EnginePlaylists::new(Arc::new(MemoryConfigStore::new(config)));
        assert!(matches!(source.playlists(), Err(PlaylistError::UnknownInstallPath(_))));
    }
}
