//! Configuration module for wallpaperd.
//!
//! The daemon reads the same `config.json` the GUI writes, under
//! `$XDG_CONFIG_HOME/linux-wallpaperengine-gui/`. Access goes through the
//! [`ConfigStore`] trait so the scheduler and reconciler can be driven by an
//! in-memory store in tests.

pub mod types;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tempfile::NamedTempFile;

pub use types::{AppConfig, ConfigError, PlaylistSelection, ScreenConfig};

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, STEAM_LIBRARIES, WORKSHOP_SUFFIX};
use crate::platform::path;

/// Source of truth for the daemon configuration.
///
/// Writes are last-write-wins; callers always read, modify and write back.
pub trait ConfigStore: Send + Sync {
    /// Reads the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or parsed.
    fn read(&self) -> Result<AppConfig, ConfigError>;

    /// Replaces the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn write(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

/// Returns the default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Configuration stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Creates a store at the `--config` override, or the default location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDirectory`] when no override is given and
    /// the XDG config directory cannot be determined.
    pub fn from_override(custom: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(custom) = custom.filter(|value| !value.trim().is_empty()) {
            return Ok(Self::new(path::expand(custom)));
        }
        default_config_path()
            .map(Self::new)
            .ok_or(ConfigError::MissingDirectory("config"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl ConfigStore for JsonConfigStore {
    fn read(&self) -> Result<AppConfig, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "configuration file missing, using defaults");
                return Ok(AppConfig::default());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, config)?;
        file.write_all(b"\n")?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Configuration held in memory.
///
/// Counts writes and can be told to fail them, which makes it the store of
/// choice for exercising the scheduler without touching disk.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<AppConfig>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryConfigStore {
    /// Creates a store holding `config`.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Mutex::new(config),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    /// Makes subsequent writes fail with an IO error.
    pub fn set_fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

    /// Returns a copy of the stored configuration.
    #[must_use]
    pub fn snapshot(&self) -> AppConfig { self.config.lock().clone() }
}

impl ConfigStore for MemoryConfigStore {
    fn read(&self) -> Result<AppConfig, ConfigError> { Ok(self.config.lock().clone()) }

    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "writes disabled",
            )));
        }
        *self.config.lock() = config.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Resolves the Wallpaper Engine workshop content directory.
///
/// `wallpaperEngineDir` wins when set. Otherwise the first existing Steam
/// library is used, falling back to the native Steam location.
///
/// # Errors
///
/// Returns [`ConfigError::MissingDirectory`] when no override is set and the
/// home directory is unknown.
pub fn workshop_dir(config: &AppConfig) -> Result<PathBuf, ConfigError> {
    if !config.wallpaper_engine_dir.trim().is_empty() {
        return Ok(path::expand(&config.wallpaper_engine_dir));
    }

    let home = dirs::home_dir().ok_or(ConfigError::MissingDirectory("home"))?;
    Ok(find_workshop_dir(&home))
}

fn find_workshop_dir(home: &Path) -> PathBuf {
    STEAM_LIBRARIES
        .iter()
        .map(|library| home.join(library).join(WORKSHOP_SUFFIX))
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| home.join(STEAM_LIBRARIES[0]).join(WORKSHOP_SUFFIX))
}
