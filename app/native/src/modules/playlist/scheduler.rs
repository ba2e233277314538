//! Playlist scheduler.
//!
//! Owns the registry of per-screen sessions. The registry lock is held for the
//! whole of `start`, so two starts for the same screen can never leave two
//! actors running.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::error::{PlaylistError, PlaylistResult};
use super::ids::extract_wallpaper_ids;
use super::session::{
    Rotation, SessionActor, SessionCommand, SessionShared, cycle_interval, interval_from_minutes,
};
use super::store::PlaylistSource;
use crate::config::ConfigStore;
use crate::constants::{RETARGET_SEND_TIMEOUT, SESSION_CHANNEL_CAPACITY};
use crate::modules::renderer::ApplyWallpapers;

/// Status of one cycling session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Always `true` for a listed session.
    pub active: bool,
    /// Whether ticks are being skipped.
    pub paused: bool,
    /// Playlist name.
    pub playlist: String,
    /// Number of wallpapers in rotation.
    pub wallpaper_count: usize,
    /// Current timer period in seconds.
    pub interval_seconds: u64,
}

struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    shared: Arc<SessionShared>,
    task: JoinHandle<()>,
    playlist: String,
    wallpaper_count: usize,
}

impl SessionHandle {
    /// Signals the actor and drops the sender, so it ends even if the stop
    /// message does not fit in the channel.
    fn signal_stop(self) -> JoinHandle<()> {
        if let Err(TrySendError::Full(_)) = self.commands.try_send(SessionCommand::Stop) {
            tracing::debug!("session channel full, relying on close to stop it");
        }
        self.task
    }
}

/// Runs one playlist session per screen.
pub struct Scheduler {
    config: Arc<dyn ConfigStore>,
    playlists: Arc<dyn PlaylistSource>,
    applier: Arc<dyn ApplyWallpapers>,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl Scheduler {
    /// Creates a scheduler with no sessions.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        playlists: Arc<dyn PlaylistSource>,
        applier: Arc<dyn ApplyWallpapers>,
    ) -> Self {
        Self {
            config,
            playlists,
            applier,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts cycling the configured playlist on `screen`.
    ///
    /// Any previous session for the screen is stopped and awaited first. One
    /// wallpaper is applied right away; a failure there is logged and does not
    /// fail the start. Returns the cycle interval, or `None` when the playlist
    /// delay is zero and no session was kept.
    ///
    /// # Errors
    ///
    /// Returns an error if no playlist is selected, it does not exist, or it
    /// has nothing to cycle through.
    pub async fn start(&self, screen: &str) -> PlaylistResult<Option<Duration>> {
        let mut sessions = self.sessions.lock().await;

        if let Some(previous) = sessions.remove(screen) {
            tracing::info!(screen, "replacing running playlist cycle");
            if let Err(err) = previous.signal_stop().await {
                tracing::warn!(screen, error = %err, "previous playlist session failed");
            }
        }

        let config = self.config.read()?;
        if config.selected_playlist().is_empty() {
            return Err(PlaylistError::NoPlaylistConfigured);
        }

        let playlist = self.playlists.find(config.selected_playlist())?;
        if playlist.items.is_empty() {
            return Err(PlaylistError::Empty(playlist.name));
        }
        let candidates = extract_wallpaper_ids(&playlist.items);
        if candidates.is_empty() {
            return Err(PlaylistError::NoCandidates(playlist.name));
        }

        let delay = playlist.settings.delay;
        let name = playlist.name.clone();
        let rotation = Rotation::new(
            screen,
            playlist,
            candidates,
            Arc::clone(&self.config),
            Arc::clone(&self.applier),
        );

        if let Err(err) = rotation.apply_random(config) {
            tracing::error!(screen, error = %err, "failed to apply initial playlist wallpaper");
        }

        if delay == 0 {
            tracing::info!(screen, playlist = %name, "playlist delay is 0, applied a single wallpaper");
            return Ok(None);
        }

        let interval = cycle_interval(delay);
        let wallpaper_count = rotation.len();
        let shared = Arc::new(SessionShared::new(interval));
        let (commands, receiver) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let task = tokio::spawn(SessionActor::new(rotation, Arc::clone(&shared), receiver).run());

        sessions.insert(screen.to_string(), SessionHandle {
            commands,
            shared,
            task,
            playlist: name.clone(),
            wallpaper_count,
        });

        tracing::info!(
            screen,
            playlist = %name,
            wallpapers = wallpaper_count,
            interval_secs = interval.as_secs(),
            "started playlist cycle"
        );
        Ok(Some(interval))
    }

    /// Stops the session on `screen` without waiting for it to wind down.
    ///
    /// Returns `false` if nothing was cycling there.
    pub async fn stop(&self, screen: &str) -> bool {
        let Some(handle) = self.sessions.lock().await.remove(screen) else {
            return false;
        };
        drop(handle.signal_stop());
        tracing::info!(screen, "stopped playlist cycle");
        true
    }

    /// Changes the timer period of a running session, keeping its paused state.
    ///
    /// Returns the effective interval after clamping.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::NotRunning`] without a session and
    /// [`PlaylistError::Timeout`] if the session does not accept the change
    /// within a second.
    pub async fn update_interval(&self, screen: &str, minutes: f64) -> PlaylistResult<Duration> {
        let sessions = self.sessions.lock().await;
        let handle = sessions
            .get(screen)
            .ok_or_else(|| PlaylistError::NotRunning(screen.to_string()))?;

        let interval = interval_from_minutes(minutes);
        match handle
            .commands
            .send_timeout(SessionCommand::Retarget(interval), RETARGET_SEND_TIMEOUT)
            .await
        {
            Ok(()) => {
                tracing::debug!(screen, interval_secs = interval.as_secs(), "sent interval update");
                Ok(interval)
            }
            Err(SendTimeoutError::Timeout(_)) => Err(PlaylistError::Timeout(screen.to_string())),
            Err(SendTimeoutError::Closed(_)) => Err(PlaylistError::SessionClosed(screen.to_string())),
        }
    }

    /// Pauses every running session. Returns how many were signalled.
    pub async fn pause_all(&self) -> usize { self.broadcast(true).await }

    /// Resumes every paused session. Returns how many were signalled.
    pub async fn resume_all(&self) -> usize { self.broadcast(false).await }

    async fn broadcast(&self, pause: bool) -> usize {
        let command = if pause { SessionCommand::Pause } else { SessionCommand::Resume };
        let sessions = self.sessions.lock().await;

        let mut delivered = 0;
        for (screen, handle) in sessions.iter() {
            if handle.shared.is_paused() == pause {
                continue;
            }
            match handle.commands.try_send(command) {
                Ok(()) => delivered += 1,
                Err(err) => tracing::debug!(screen = %screen, error = %err, "dropped playlist control message"),
            }
        }
        delivered
    }

    /// Status per cycling screen. Empty when nothing is cycling.
    pub async fn status(&self) -> BTreeMap<String, SessionStatus> {
        self.sessions
            .lock()
            .await
            .iter()
            .map(|(screen, handle)| {
                (screen.clone(), SessionStatus {
                    active: true,
                    paused: handle.shared.is_paused(),
                    playlist: handle.playlist.clone(),
                    wallpaper_count: handle.wallpaper_count,
                    interval_seconds: handle.shared.interval().as_secs(),
                })
            })
            .collect()
    }

    /// Whether a session is running on `screen`.
    pub async fn is_running(&self, screen: &str) -> bool { self.sessions.lock().await.contains_key(screen) }

    /// Stops every session and waits for the actors to exit.
    pub async fn stop_all(&self) {
        let drained: Vec<(String, SessionHandle)> = self.sessions.lock().await.drain().collect();
        for (screen, handle) in drained {
            if let Err(err) = handle.signal_stop().await {
                tracing::warn!(screen = %screen, error = %err, "playlist session failed");
            }
        }
    }
}
