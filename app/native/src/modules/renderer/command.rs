//! Renderer command line construction.
//!
//! The command string is compared byte for byte against the running process to
//! decide whether a screen needs a restart, so argument order and spelling are
//! fixed.

use serde::Serialize;

use crate::config::AppConfig;
use crate::constants::{DEFAULT_FPS, DEFAULT_RENDERER};

/// Target command for one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredRender {
    /// Output name.
    pub screen: String,
    /// Full shell command line.
    pub command: String,
}

impl DesiredRender {
    /// Creates a desired render entry.
    #[must_use]
    pub fn new(screen: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            command: command.into(),
        }
    }
}

/// Ordered desired state, one entry per rendering screen.
pub type DesiredRenderSet = Vec<DesiredRender>;

/// Returns the renderer executable configured in `config`.
#[must_use]
pub fn executable(config: &AppConfig) -> &str {
    if config.custom_executable_location.is_empty() {
        DEFAULT_RENDERER
    } else {
        &config.custom_executable_location
    }
}

/// Builds the renderer command that shows `wallpaper` on `screen`.
#[must_use]
pub fn build_command(config: &AppConfig, screen: &str, wallpaper: &str) -> String {
    let fps = if config.fps == 0 { DEFAULT_FPS } else { config.fps };
    let mut args: Vec<String> = vec![
        executable(config).to_string(),
        wallpaper.to_string(),
        "-r".to_string(),
        screen.to_string(),
        format!("-f {fps}"),
    ];

    if config.silence {
        args.push("-s".to_string());
    } else if let Some(volume) = config.volume {
        #[allow(clippy::cast_possible_truncation)]
        let volume = volume.trunc() as i64;
        args.push(format!("--volume {volume}"));
    }

    push_flag(&mut args, config.no_automute, "--noautomute");
    push_flag(&mut args, config.no_audio_processing, "--no-audio-processing");
    if !config.scaling.is_empty() {
        args.push(format!("--scaling {}", config.scaling));
    }
    if !config.clamping.is_empty() {
        args.push(format!("--clamp {}", config.clamping));
    }
    push_flag(&mut args, config.disable_mouse, "--disable-mouse");
    push_flag(&mut args, config.disable_parallax, "--disable-parallax");
    push_flag(&mut args, config.no_fullscreen_pause, "--no-fullscreen-pause");
    push_flag(&mut args, config.disable_particles, "--disable-particles");
    push_flag(&mut args, config.fullscreen_pause_only_active, "--fullscreen-pause-only-active");

    for app_id in &config.fullscreen_pause_ignore_app_ids {
        args.push(format!("--fullscreen-pause-ignore-appid {app_id}"));
    }

    if !config.screenshot.is_empty() {
        args.push(format!("--screenshot \"{}\"", config.screenshot));
    }
    if config.screenshot_delay != 0 {
        args.push(format!("--screenshot-delay {}", config.screenshot_delay));
    }
    if !config.assets_dir.is_empty() {
        args.push(format!("--assets-dir \"{}\"", config.assets_dir));
    }
    push_flag(&mut args, config.dump_structure, "--dump-structure");

    for playlist in config.playlist_args() {
        args.push(format!("--playlist \"{playlist}\""));
    }

    let properties = config.wallpaper_properties.get(wallpaper).unwrap_or(&config.properties);
    for (key, value) in properties {
        args.push(format!("--set-property {key}=\"{value}\""));
    }

    if config.custom_args_enabled && !config.custom_args.is_empty() {
        args.push(config.custom_args.clone());
    }

    args.join(" ")
}

fn push_flag(args: &mut Vec<String>, enabled: bool, flag: &str) {
    if enabled {
        args.push(flag.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::PlaylistSelection;

    fn bare_config() -> AppConfig {
        serde_json::from_str("{}").unwrap()
    }

    #[test]
    fn test_minimal_command() {
        assert_eq!(
            build_command(&bare_config(), "DP-1", "123"),
            "linux-wallpaperengine 123 -r DP-1 -f 60"
        );
    }

    #[test]
    fn test_default_config_command() {
        assert_eq!(
            build_command(&AppConfig::default(), "HDMI-1", "42"),
            "linux-wallpaperengine 42 -r HDMI-1 -f 60 --volume 100 --scaling default --clamp clamp --screenshot-delay 5"
        );
    }

    #[test]
    fn test_silence_wins_over_volume() {
        let config = AppConfig {
            silence: true,
            volume: Some(40.0),
            ..bare_config()
        };
        assert_eq!(build_command(&config, "DP-1", "1"), "linux-wallpaperengine 1 -r DP-1 -f 60 -s");
    }

    #[test]
    fn test_volume_is_truncated() {
        let config = AppConfig {
            volume: Some(42.9),
            ..bare_config()
        };
        assert!(build_command(&config, "DP-1", "1").ends_with("--volume 42"));
    }

    #[test]
    fn test_full_argument_order() {
        let mut properties = BTreeMap::new();
        properties.insert("speed".to_string(), "2".to_string());
        properties.insert("bloom".to_string(), "1".to_string());

        let config = AppConfig {
            fps: 30,
            volume: Some(50.0),
            no_automute: true,
            no_audio_processing: true,
            scaling: "fill".to_string(),
            clamping: "border".to_string(),
            disable_mouse: true,
            disable_parallax: true,
            no_fullscreen_pause: true,
            disable_particles: true,
            fullscreen_pause_only_active: true,
            fullscreen_pause_ignore_app_ids: vec!["steam".to_string(), "mpv".to_string()],
            screenshot: "/tmp/shot.png".to_string(),
            screenshot_delay: 3,
            assets_dir: "/opt/assets".to_string(),
            dump_structure: true,
            playlist: PlaylistSelection::Args(vec!["Chill".to_string()]),
            properties,
            custom_args: "--window 0x0x800x600".to_string(),
            custom_args_enabled: true,
            custom_executable_location: "/opt/lwe/linux-wallpaperengine".to_string(),
            ..bare_config()
        };

        assert_eq!(
            build_command(&config, "DP-1", "777"),
            "/opt/lwe/linux-wallpaperengine 777 -r DP-1 -f 30 --volume 50 --noautomute \
             --no-audio-processing --scaling fill --clamp border --disable-mouse \
             --disable-parallax --no-fullscreen-pause --disable-particles \
             --fullscreen-pause-only-active --fullscreen-pause-ignore-appid steam \
             --fullscreen-pause-ignore-appid mpv --screenshot \"/tmp/shot.png\" \
             --screenshot-delay 3 --assets-dir \"/opt/assets\" --dump-structure \
             --playlist \"Chill\" --set-property bloom=\"1\" --set-property speed=\"2\" \
             --window 0x0x800x600"
        );
    }

    #[test]
    fn test_wallpaper_properties_override_global() {
        let mut config = bare_config();
        config.properties.insert("global".to_string(), "1".to_string());
        config
            .wallpaper_properties
            .insert("9".to_string(), BTreeMap::from([("own".to_string(), "x".to_string())]));

        let own = build_command(&config, "DP-1", "9");
        assert!(own.ends_with("--set-property own=\"x\""));
        assert!(!own.contains("global"));

        let other = build_command(&config, "DP-1", "10");
        assert!(other.ends_with("--set-property global=\"1\""));
    }

    #[test]
    fn test_custom_args_need_enabled_flag() {
        let config = AppConfig {
            custom_args: "--extra".to_string(),
            ..bare_config()
        };
        assert!(!build_command(&config, "DP-1", "1").contains("--extra"));
    }
}
