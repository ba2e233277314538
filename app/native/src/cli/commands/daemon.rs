//! The long-running daemon.
//!
//! Applies wallpapers once, then keeps them in line with the connected
//! displays and the workshop directory until SIGINT or SIGTERM. On the way
//! out every playlist session is stopped and every renderer killed.

use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};

use crate::constants::{APP_NAME, DISPLAY_POLL_INTERVAL};
use crate::error::WallpaperdError;
use crate::modules::library::{LibraryEventKind, LibraryWatcher};
use crate::modules::renderer::command::executable;
use crate::platform::display::spawn_display_watcher;
use crate::service::WallpaperService;
use crate::utils::command::resolve_binary;

/// Builds the runtime and runs the daemon to completion.
///
/// # Errors
///
/// Returns an error if the service or the runtime cannot be created.
pub fn execute(config: Option<&str>, cycle: &[String]) -> Result<(), WallpaperdError> {
    let service = Arc::new(WallpaperService::system(config)?);
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(service, cycle));
    Ok(())
}

/// Runs the daemon until a shutdown signal arrives.
pub async fn run(service: Arc<WallpaperService>, cycle: &[String]) {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting {APP_NAME}");
    check_renderer(&service);

    if let Err(err) = service.apply_wallpapers() {
        tracing::error!(error = %err, "failed to apply wallpapers on startup");
    }

    let displays = {
        let service = Arc::clone(&service);
        spawn_display_watcher(Arc::clone(service.displays()), DISPLAY_POLL_INTERVAL, move |_| {
            let service = Arc::clone(&service);
            async move {
                if let Err(err) = service.apply_wallpapers() {
                    tracing::error!(error = %err, "failed to apply wallpapers on display change");
                }
            }
        })
    };

    let detector = {
        let service = Arc::clone(&service);
        service.fullscreen_detector().spawn(move |fullscreen| {
            let service = Arc::clone(&service);
            async move {
                let signalled = if fullscreen {
                    service.pause_playlists().await
                } else {
                    service.resume_playlists().await
                };
                tracing::debug!(fullscreen, sessions = signalled, "forwarded fullscreen change");
            }
        })
    };

    let library = watch_library(&service);

    for screen in cycle {
        match service.start_playlist_cycle(screen).await {
            Ok(Some(interval)) => {
                tracing::info!(screen = %screen, interval_secs = interval.as_secs(), "cycling playlist");
            }
            Ok(None) => tracing::info!(screen = %screen, "applied one-shot playlist"),
            Err(err) => tracing::error!(screen = %screen, error = %err, "failed to start playlist cycle"),
        }
    }

    shutdown_signal().await;
    tracing::info!("shutting down");

    displays.abort();
    drop(detector);
    drop(library);
    service.shutdown().await;
}

/// Warns early when the renderer cannot be found, since every spawn would fail.
fn check_renderer(service: &WallpaperService) {
    let Ok(config) = service.config().read() else {
        return;
    };
    match resolve_binary(executable(&config)) {
        Ok(path) => tracing::debug!(renderer = %path.display(), "found renderer"),
        Err(err) => tracing::warn!(error = %err, "renderer not found, wallpapers will not start"),
    }
}

/// Stops renderers for wallpapers whose workshop folder disappears.
fn watch_library(service: &Arc<WallpaperService>) -> Option<LibraryWatcher> {
    let dir = match service.workshop_dir() {
        Ok(dir) if dir.is_dir() => dir,
        Ok(dir) => {
            tracing::warn!(dir = %dir.display(), "wallpaper directory does not exist, not watching");
            return None;
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to resolve wallpaper directory");
            return None;
        }
    };

    let supervisor = Arc::clone(service.supervisor());
    let watcher = LibraryWatcher::spawn(&dir, move |event| {
        if event.kind != LibraryEventKind::Removed {
            return;
        }
        if let Some(folder) = event.folder_name() {
            let stopped = supervisor.stop_matching(folder);
            if stopped > 0 {
                tracing::info!(wallpaper = folder, renderers = stopped, "stopped renderers for removed wallpaper");
            }
        }
    });

    match watcher {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(error = %err, "failed to watch wallpaper directory");
            None
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "failed to install SIGTERM handler");
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to wait for SIGINT");
            }
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!(error = %err, "failed to wait for SIGINT");
            }
        }
        _ = terminate.recv() => tracing::debug!("received SIGTERM"),
    }
}
