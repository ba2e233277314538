//! Application-wide constants.

use std::time::Duration;

/// Application name used in CLI output and completions.
pub const APP_NAME: &str = "wallpaperd";

/// Directory under the XDG config home that holds the shared GUI configuration.
pub const CONFIG_DIR_NAME: &str = "linux-wallpaperengine-gui";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Renderer executable used when `customExecutableLocation` is empty.
pub const DEFAULT_RENDERER: &str = "linux-wallpaperengine";

/// Frame rate passed to the renderer when `FPS` is unset or zero.
pub const DEFAULT_FPS: u32 = 60;

/// Scheduler target that drives the clone-mode global wallpaper.
pub const GLOBAL_SCREEN: &str = "Global";

/// Workshop content directory relative to a Steam library root.
pub const WORKSHOP_SUFFIX: &str = "steamapps/workshop/content/431960";

/// Wallpaper Engine install directory relative to a Steam library root.
pub const ENGINE_INSTALL_SUFFIX: &str = "steamapps/common/wallpaper_engine";

/// Steam library roots relative to the home directory, in lookup order.
pub const STEAM_LIBRARIES: &[&str] = &[
    ".local/share/Steam",
    ".var/app/com.valvesoftware.Steam/.local/share/Steam",
    ".steam/steam",
    ".steam/root",
];

/// Tracing target for forwarded renderer output.
pub const RENDERER_LOG_TARGET: &str = "renderer";

/// Environment variable with extra colon-separated directories to search for executables.
pub const EXTRA_PATHS_ENV: &str = "WALLPAPERD_EXTRA_PATHS";

/// How often the fullscreen detector polls the active window.
pub const FULLSCREEN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How often the display watcher polls the connected outputs.
pub const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Shortest interval a playlist session cycles at.
pub const MIN_CYCLE_INTERVAL: Duration = Duration::from_secs(60);

/// Longest interval a playlist session cycles at.
pub const MAX_CYCLE_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Upper bound for delivering an interval change to a running session.
pub const RETARGET_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Quiet period before a burst of workshop directory events is handled.
pub const LIBRARY_DEBOUNCE: Duration = Duration::from_millis(500);

/// Capacity of each session's command channel.
pub const SESSION_CHANNEL_CAPACITY: usize = 8;

/// Defaults Wallpaper Engine uses for a newly created playlist.
pub mod playlist_defaults {
    /// Delay between items, in seconds.
    pub const DELAY: i64 = 60;
    /// Advance mode.
    pub const MODE: &str = "timer";
    /// Item order.
    pub const ORDER: &str = "random";
}
