//! The request-facing surface of the daemon.
//!
//! [`WallpaperService`] owns every long-lived collaborator and exposes the
//! operations a front end invokes. All errors are folded into
//! [`WallpaperdError`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{self, ConfigStore, JsonConfigStore};
use crate::constants::GLOBAL_SCREEN;
use crate::error::WallpaperdError;
use crate::modules::fullscreen::FullscreenDetector;
use crate::modules::library::{self, WallpaperEntry, WallpaperLibrary};
use crate::modules::playlist::{EnginePlaylists, Playlist, PlaylistSource, Scheduler, SessionStatus};
use crate::modules::renderer::command::executable;
use crate::modules::renderer::{ApplyWallpapers, Reconciler, Supervisor};
use crate::platform::{DisplayProvider, WindowStateQuery, XpropWindowQuery, XrandrDisplays};

/// The wallpaper shown on the first connected, configured screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWallpaper {
    /// Workshop folder name.
    pub folder_name: String,
    /// Library entry for the folder.
    #[serde(flatten)]
    pub entry: WallpaperEntry,
}

/// Result of [`WallpaperService::load_wallpapers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedWallpapers {
    /// Every installed wallpaper, keyed by folder name.
    pub wallpapers: WallpaperLibrary,
    /// The wallpaper currently shown, if it is installed.
    pub selected_wallpaper: Option<SelectedWallpaper>,
}

/// Maps an empty screen name to the clone-mode target.
#[must_use]
pub fn screen_or_global(screen: &str) -> &str {
    if screen.trim().is_empty() { GLOBAL_SCREEN } else { screen }
}

/// Owns the reconciler, supervisor and playlist scheduler.
pub struct WallpaperService {
    config: Arc<dyn ConfigStore>,
    displays: Arc<dyn DisplayProvider>,
    window: Arc<dyn WindowStateQuery>,
    playlists: Arc<dyn PlaylistSource>,
    supervisor: Arc<Supervisor>,
    reconciler: Arc<Reconciler>,
    scheduler: Scheduler,
}

impl WallpaperService {
    /// Wires a service from its collaborators.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        displays: Arc<dyn DisplayProvider>,
        window: Arc<dyn WindowStateQuery>,
        playlists: Arc<dyn PlaylistSource>,
    ) -> Self {
        let supervisor = Arc::new(Supervisor::new());
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&config),
            Arc::clone(&displays),
            Arc::clone(&supervisor),
        ));
        let scheduler = Scheduler::new(
            Arc::clone(&config),
            Arc::clone(&playlists),
            Arc::clone(&reconciler) as Arc<dyn ApplyWallpapers>,
        );

        Self {
            config,
            displays,
            window,
            playlists,
            supervisor,
            reconciler,
            scheduler,
        }
    }

    /// Wires a service against the real desktop: the JSON config file,
    /// `xrandr`, `xprop` and Wallpaper Engine's playlist document.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration path can be determined.
    pub fn system(config_path: Option<&str>) -> Result<Self, WallpaperdError> {
        let config: Arc<dyn ConfigStore> = Arc::new(JsonConfigStore::from_override(config_path)?);
        let playlists = Arc::new(EnginePlaylists::new(Arc::clone(&config)));
        Ok(Self::new(config, Arc::new(XrandrDisplays), Arc::new(XpropWindowQuery), playlists))
    }

    /// The configuration store.
    #[must_use]
    pub fn config(&self) -> &Arc<dyn ConfigStore> { &self.config }

    /// The display provider.
    #[must_use]
    pub fn displays(&self) -> &Arc<dyn DisplayProvider> { &self.displays }

    /// The renderer supervisor.
    #[must_use]
    pub fn supervisor(&self) -> &Arc<Supervisor> { &self.supervisor }

    /// A fullscreen detector bound to this service's configuration and
    /// window query.
    #[must_use]
    pub fn fullscreen_detector(&self) -> FullscreenDetector {
        FullscreenDetector::new(Arc::clone(&self.config), Arc::clone(&self.window))
    }

    /// Resolves the workshop directory from the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or no home
    /// directory is known.
    pub fn workshop_dir(&self) -> Result<PathBuf, WallpaperdError> {
        Ok(config::workshop_dir(&self.config.read()?)?)
    }

    /// Runs one reconcile pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or displays
    /// cannot be enumerated. Nothing is changed in that case.
    pub fn apply_wallpapers(&self) -> Result<(), WallpaperdError> { self.reconciler.apply() }

    /// Scans the wallpaper library, reports the wallpaper currently shown,
    /// and re-applies wallpapers.
    ///
    /// A failed display query or reconcile pass is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the workshop
    /// directory cannot be listed.
    pub fn load_wallpapers(&self) -> Result<LoadedWallpapers, WallpaperdError> {
        let config = self.config.read()?;
        let wallpapers = library::scan_workshop(&config::workshop_dir(&config)?)?;

        let connected = self.displays.connected_screens().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to enumerate displays");
            Vec::new()
        });
        let selected_wallpaper = config
            .screens
            .iter()
            .filter(|screen| connected.contains(&screen.name))
            .filter_map(|screen| screen.wallpaper.as_deref())
            .find_map(|folder| {
                wallpapers.get(folder).map(|entry| SelectedWallpaper {
                    folder_name: folder.to_string(),
                    entry: entry.clone(),
                })
            });

        if let Err(err) = self.apply_wallpapers() {
            tracing::warn!(error = %err, "failed to apply wallpapers after loading library");
        }

        Ok(LoadedWallpapers {
            wallpapers,
            selected_wallpaper,
        })
    }

    /// Returns the `general.properties` of an installed wallpaper.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallpaper is not installed or its manifest is
    /// unreadable.
    pub fn wallpaper_properties(&self, id: &str) -> Result<Map<String, Value>, WallpaperdError> {
        Ok(library::wallpaper_properties(&self.workshop_dir()?, id)?)
    }

    /// Currently connected screens.
    ///
    /// # Errors
    ///
    /// Returns an error if the display server cannot be queried.
    pub fn screens(&self) -> Result<Vec<String>, WallpaperdError> { Ok(self.displays.connected_screens()?) }

    /// Starts cycling the selected playlist on `screen`.
    ///
    /// Returns the cycle interval, or `None` for a one-shot playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable playlist is selected.
    pub async fn start_playlist_cycle(&self, screen: &str) -> Result<Option<Duration>, WallpaperdError> {
        Ok(self.scheduler.start(screen_or_global(screen)).await?)
    }

    /// Selects playlist `name` and starts cycling it on `screen`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written or the
    /// playlist cannot be started.
    pub async fn start_playlist(
        &self,
        screen: &str,
        name: &str,
        interval_minutes: f64,
    ) -> Result<Option<Duration>, WallpaperdError> {
        let mut config = self.config.read()?;
        config.playlist = name.into();
        config.playlist_interval = interval_minutes;
        self.config.write(&config)?;

        self.start_playlist_cycle(screen).await
    }

    /// Stops cycling on `screen`. Returns `false` if nothing was cycling.
    pub async fn stop_playlist_cycle(&self, screen: &str) -> bool {
        self.scheduler.stop(screen_or_global(screen)).await
    }

    /// Changes the interval of a running session and persists it.
    ///
    /// The playlist delay and `playlistInterval` are only written once the
    /// session has accepted the new interval.
    ///
    /// # Errors
    ///
    /// Returns an error if no session runs on `screen`, the session does not
    /// accept the change in time, or the new interval cannot be saved.
    pub async fn update_playlist_interval(
        &self,
        screen: &str,
        playlist: &str,
        minutes: f64,
    ) -> Result<Duration, WallpaperdError> {
        let interval = self.scheduler.update_interval(screen_or_global(screen), minutes).await?;

        self.playlists.set_interval(playlist, minutes)?;
        let mut config = self.config.read()?;
        config.playlist_interval = minutes;
        self.config.write(&config)?;

        Ok(interval)
    }

    /// Status of every cycling session, keyed by screen.
    pub async fn playlist_status(&self) -> BTreeMap<String, SessionStatus> { self.scheduler.status().await }

    /// Pauses every cycling session. Returns how many were signalled.
    pub async fn pause_playlists(&self) -> usize { self.scheduler.pause_all().await }

    /// Resumes every paused session. Returns how many were signalled.
    pub async fn resume_playlists(&self) -> usize { self.scheduler.resume_all().await }

    /// Stops every renderer, including ones this daemon did not start.
    ///
    /// Returns how many tracked renderers were signalled.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    pub fn kill_all_wallpapers(&self) -> Result<usize, WallpaperdError> {
        let config = self.config.read()?;
        Ok(self.supervisor.kill_all(&process_name(executable(&config))))
    }

    /// All playlists in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist document cannot be read.
    pub fn playlists(&self) -> Result<Vec<Playlist>, WallpaperdError> { Ok(self.playlists.playlists()?) }

    /// Creates an empty playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or taken.
    pub fn create_playlist(&self, name: &str) -> Result<Playlist, WallpaperdError> {
        Ok(self.playlists.create(name)?)
    }

    /// Renames a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if `old` is unknown or `new` is blank or taken.
    pub fn rename_playlist(&self, old: &str, new: &str) -> Result<(), WallpaperdError> {
        Ok(self.playlists.rename(old, new)?)
    }

    /// Deletes a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist.
    pub fn delete_playlist(&self, name: &str) -> Result<(), WallpaperdError> { Ok(self.playlists.delete(name)?) }

    /// Replaces the items of a playlist.
    ///
    /// # Errors
    ///
    /// Returns an error if it does not exist.
    pub fn set_playlist_items(&self, name: &str, items: Vec<String>) -> Result<(), WallpaperdError> {
        Ok(self.playlists.set_items(name, items)?)
    }

    /// Stops every session and every renderer.
    pub async fn shutdown(&self) {
        self.scheduler.stop_all().await;
        match self.kill_all_wallpapers() {
            Ok(count) => tracing::info!(renderers = count, "stopped all renderers"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read config on shutdown, stopping tracked renderers");
                self.supervisor.kill_all("");
            }
        }
    }
}

/// The process name `killall` matches for an executable path.
fn process_name(executable: &str) -> String {
    Path::new(executable)
        .file_name()
        .map_or_else(|| executable.to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_name() {
        assert_eq!(process_name("linux-wallpaperengine"), "linux-wallpaperengine");
        assert_eq!(process_name("/opt/lwe/build/linux-wallpaperengine"), "linux-wallpaperengine");
    }

    #[test]
    fn test_screen_or_global() {
        assert_eq!(screen_or_global(""), GLOBAL_SCREEN);
        assert_eq!(screen_or_global("  "), GLOBAL_SCREEN);
        assert_eq!(screen_or_global("DP-1"), "DP-1");
    }
}
