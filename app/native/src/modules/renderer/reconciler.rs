//! Desired-state computation.
//!
//! A pass reads the configuration and the connected screens, adopts screens
//! the configuration has never seen, and produces one command per screen that
//! has something to render.

use std::sync::Arc;

use super::ApplyWallpapers;
use super::command::{DesiredRender, DesiredRenderSet, build_command};
use super::supervisor::Supervisor;
use crate::config::{AppConfig, ConfigStore, ScreenConfig};
use crate::error::WallpaperdError;
use crate::platform::display::DisplayProvider;

/// Appends connected screens missing from `config`.
///
/// New entries get the first non-empty wallpaper assigned to any configured
/// screen. Returns `true` if anything was added.
pub fn adopt_connected_screens(config: &mut AppConfig, connected: &[String]) -> bool {
    let fallback = config
        .screens
        .iter()
        .filter_map(|screen| screen.wallpaper.as_deref())
        .find(|wallpaper| !wallpaper.is_empty())
        .map(ToString::to_string);

    let mut changed = false;
    for name in connected {
        if config.screen(name).is_some() {
            continue;
        }
        if let Some(wallpaper) = &fallback {
            tracing::info!(screen = %name, wallpaper = %wallpaper, "assigning fallback wallpaper to new screen");
        } else {
            tracing::info!(screen = %name, "adopting new screen");
        }
        config.screens.push(ScreenConfig::new(name.clone(), fallback.clone()));
        changed = true;
    }
    changed
}

/// Computes the command per connected, configured screen, in connected order.
#[must_use]
pub fn desired_renders(config: &AppConfig, connected: &[String]) -> DesiredRenderSet {
    let global = config.global_wallpaper.as_deref().filter(|_| config.clone_mode);

    connected
        .iter()
        .filter_map(|name| config.screen(name))
        .filter_map(|screen| {
            let target = global.or(screen.wallpaper.as_deref()).unwrap_or_default();
            if target.is_empty() {
                tracing::debug!(screen = %screen.name, "no wallpaper assigned, skipping");
                return None;
            }
            Some(DesiredRender::new(&screen.name, build_command(config, &screen.name, target)))
        })
        .collect()
}

/// Reconciler bound to its collaborators.
pub struct Reconciler {
    config: Arc<dyn ConfigStore>,
    displays: Arc<dyn DisplayProvider>,
    supervisor: Arc<Supervisor>,
}

impl Reconciler {
    /// Creates a reconciler.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        displays: Arc<dyn DisplayProvider>,
        supervisor: Arc<Supervisor>,
    ) -> Self {
        Self {
            config,
            displays,
            supervisor,
        }
    }

    /// Computes the desired state, persisting newly adopted screens.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or the displays
    /// cannot be enumerated. A failure to persist adopted screens is logged.
    pub fn plan(&self) -> Result<DesiredRenderSet, WallpaperdError> {
        let mut config = self.config.read()?;
        let connected = self.displays.connected_screens()?;

        if adopt_connected_screens(&mut config, &connected)
            && let Err(err) = self.config.write(&config)
        {
            tracing::warn!(error = %err, "failed to persist newly connected screens");
        }

        Ok(desired_renders(&config, &connected))
    }
}

impl ApplyWallpapers for Reconciler {
    fn apply(&self) -> Result<(), WallpaperdError> {
        let desired = self.plan()?;
        self.supervisor.reconcile(&desired);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::platform::display::{DisplayError, StaticDisplays};

    fn screens(names: &[&str]) -> Vec<String> { names.iter().map(ToString::to_string).collect() }

    fn bare_config() -> AppConfig { serde_json::from_str("{}").unwrap() }

    #[test]
    fn test_new_screen_gets_fallback_wallpaper() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", Some("123".to_string())));

        assert!(adopt_connected_screens(&mut config, &screens(&["DP-1", "HDMI-1"])));
        assert_eq!(config.screens.len(), 2);
        assert_eq!(config.screens[1].name, "HDMI-1");
        assert_eq!(config.screens[1].wallpaper.as_deref(), Some("123"));

        let desired = desired_renders(&config, &screens(&["DP-1", "HDMI-1"]));
        assert_eq!(desired.len(), 2);
        assert_eq!(desired[0].screen, "DP-1");
        assert!(desired[1].command.starts_with("linux-wallpaperengine 123 -r HDMI-1"));
    }

    #[test]
    fn test_fallback_skips_empty_wallpapers() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", Some(String::new())));
        config.screens.push(ScreenConfig::new("DP-2", Some("77".to_string())));

        adopt_connected_screens(&mut config, &screens(&["HDMI-1"]));
        assert_eq!(config.screen("HDMI-1").unwrap().wallpaper.as_deref(), Some("77"));
    }

    #[test]
    fn test_known_screens_are_not_adopted() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", None));
        assert!(!adopt_connected_screens(&mut config, &screens(&["DP-1"])));
    }

    #[test]
    fn test_disconnected_screens_are_kept_but_not_rendered() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", Some("1".to_string())));
        config.screens.push(ScreenConfig::new("DP-2", Some("2".to_string())));

        let desired = desired_renders(&config, &screens(&["DP-2"]));
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].screen, "DP-2");
        assert_eq!(config.screens.len(), 2);
    }

    #[test]
    fn test_clone_mode_uses_global_wallpaper() {
        let mut config = bare_config();
        config.clone_mode = true;
        config.global_wallpaper = Some("999".to_string());
        config.screens.push(ScreenConfig::new("DP-1", Some("1".to_string())));
        config.screens.push(ScreenConfig::new("DP-2", None));

        let desired = desired_renders(&config, &screens(&["DP-1", "DP-2"]));
        assert!(desired.iter().all(|render| render.command.contains(" 999 -r ")));
        assert_eq!(desired.len(), 2);
    }

    #[test]
    fn test_clone_mode_without_global_uses_screen_wallpaper() {
        let mut config = bare_config();
        config.clone_mode = true;
        config.screens.push(ScreenConfig::new("DP-1", Some("1".to_string())));

        let desired = desired_renders(&config, &screens(&["DP-1"]));
        assert!(desired[0].command.contains(" 1 -r DP-1"));
    }

    #[test]
    fn test_screen_without_wallpaper_is_skipped() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", None));
        assert!(desired_renders(&config, &screens(&["DP-1"])).is_empty());
    }

    #[test]
    fn test_connected_order_is_kept() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("B", Some("1".to_string())));
        config.screens.push(ScreenConfig::new("A", Some("2".to_string())));

        let desired = desired_renders(&config, &screens(&["A", "B"]));
        let order: Vec<&str> = desired.iter().map(|render| render.screen.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn test_plan_persists_adopted_screens() {
        let mut config = bare_config();
        config.screens.push(ScreenConfig::new("DP-1", Some("5".to_string())));
        let store = Arc::new(MemoryConfigStore::new(config));
        let reconciler = Reconciler::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            Arc::new(StaticDisplays::new(["DP-1", "HDMI-1"])),
            Arc::new(Supervisor::new()),
        );

        let desired = reconciler.plan().unwrap();
        assert_eq!(desired.len(), 2);
        assert_eq!(store.writes(), 1);
        assert!(store.snapshot().screen("HDMI-1").is_some());

        reconciler.plan().unwrap();
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_plan_survives_write_failure() {
        let store = Arc::new(MemoryConfigStore::new(bare_config()));
        store.set_fail_writes(true);
        let reconciler = Reconciler::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            Arc::new(StaticDisplays::new(["DP-1"])),
            Arc::new(Supervisor::new()),
        );

        assert!(reconciler.plan().unwrap().is_empty());
    }

    struct FailingDisplays;

    impl DisplayProvider for FailingDisplays {
        fn connected_screens(&self) -> Result<Vec<String>, DisplayError> {
            Err(DisplayError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Can't open display".to_string(),
            })
        }
    }

    #[test]
    fn test_display_failure_aborts_pass() {
        let reconciler = Reconciler::new(
            Arc::new(MemoryConfigStore::new(bare_config())),
            Arc::new(FailingDisplays),
            Arc::new(Supervisor::new()),
        );
        assert!(matches!(reconciler.plan(), Err(WallpaperdError::DisplayError(_))));
    }
}
