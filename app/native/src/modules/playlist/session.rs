//! Per-screen playlist session actor.
//!
//! Each cycling screen gets one task that owns its timer and drains a command
//! channel. Everything a tick triggers (config read, selection, reconcile)
//! happens inline, so a session never has two passes in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::error::{PlaylistError, PlaylistResult};
use super::types::Playlist;
use crate::config::{AppConfig, ConfigStore};
use crate::constants::{GLOBAL_SCREEN, MAX_CYCLE_INTERVAL, MIN_CYCLE_INTERVAL};
use crate::modules::renderer::ApplyWallpapers;

/// Control messages understood by a session actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Stop advancing on timer ticks.
    Pause,
    /// Advance on timer ticks again.
    Resume,
    /// Restart the timer with a new period, keeping the paused state.
    Retarget(Duration),
    /// End the session.
    Stop,
}

/// State the actor publishes for status queries and delivery filtering.
#[derive(Debug)]
pub struct SessionShared {
    paused: AtomicBool,
    interval_secs: AtomicU64,
}

impl SessionShared {
    /// Creates running, unpaused state with `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            paused: AtomicBool::new(false),
            interval_secs: AtomicU64::new(interval.as_secs()),
        }
    }

    /// Whether ticks are currently ignored.
    #[must_use]
    pub fn is_paused(&self) -> bool { self.paused.load(Ordering::SeqCst) }

    /// Current timer period.
    #[must_use]
    pub fn interval(&self) -> Duration { Duration::from_secs(self.interval_secs.load(Ordering::SeqCst)) }
}

/// Clamps a playlist delay in seconds to the supported cycle intervals.
#[must_use]
pub fn cycle_interval(delay_secs: i64) -> Duration {
    Duration::from_secs(u64::try_from(delay_secs).unwrap_or(0)).clamp(MIN_CYCLE_INTERVAL, MAX_CYCLE_INTERVAL)
}

/// Converts an interval in minutes, clamped to the supported cycle intervals.
///
/// Negative and NaN values yield the minimum; values too large to represent
/// yield the maximum.
#[must_use]
pub fn interval_from_minutes(minutes: f64) -> Duration {
    let secs = minutes * 60.0;
    if secs.is_nan() || secs <= 0.0 {
        return MIN_CYCLE_INTERVAL;
    }
    Duration::try_from_secs_f64(secs)
        .map_or(MAX_CYCLE_INTERVAL, |interval| interval.clamp(MIN_CYCLE_INTERVAL, MAX_CYCLE_INTERVAL))
}

/// Picks playlist items and writes them into the desired state for one screen.
pub struct Rotation {
    screen: String,
    playlist: Playlist,
    candidates: Vec<String>,
    config: Arc<dyn ConfigStore>,
    applier: Arc<dyn ApplyWallpapers>,
}

impl Rotation {
    /// Creates a rotation over `candidates`, which must not be empty.
    pub fn new(
        screen: impl Into<String>,
        playlist: Playlist,
        candidates: Vec<String>,
        config: Arc<dyn ConfigStore>,
        applier: Arc<dyn ApplyWallpapers>,
    ) -> Self {
        Self {
            screen: screen.into(),
            playlist,
            candidates,
            config,
            applier,
        }
    }

    /// Number of wallpapers in rotation.
    #[must_use]
    pub fn len(&self) -> usize { self.candidates.len() }

    /// Whether the rotation has nothing to pick from.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    /// Assigns a random candidate, persists `config` and re-applies wallpapers.
    ///
    /// Returns the chosen wallpaper id.
    ///
    /// # Errors
    ///
    /// Returns an error if the screen is not configured, the configuration
    /// cannot be written or the reconcile pass fails.
    pub fn apply_random(&self, mut config: AppConfig) -> PlaylistResult<String> {
        if self.candidates.is_empty() {
            return Err(PlaylistError::NoCandidates(self.playlist.name.clone()));
        }
        let index = rand::rng().random_range(0..self.candidates.len());
        let wallpaper = self.candidates[index].clone();

        if self.screen == GLOBAL_SCREEN {
            config.global_wallpaper = Some(wallpaper.clone());
        } else {
            let screen = config
                .screen_mut(&self.screen)
                .ok_or_else(|| PlaylistError::ScreenNotFound(self.screen.clone()))?;
            screen.wallpaper = Some(wallpaper.clone());
            screen.playlist.clone_from(&self.playlist.name);
            #[allow(clippy::cast_precision_loss)]
            let minutes = self.playlist.settings.delay as f64 / 60.0;
            screen.playlist_interval = minutes;
        }

        self.config.write(&config)?;
        self.applier.apply().map_err(PlaylistError::Apply)?;

        tracing::info!(screen = %self.screen, wallpaper = %wallpaper, playlist = %self.playlist.name, "applied playlist wallpaper");
        Ok(wallpaper)
    }

    /// Re-reads the configuration and applies a new selection, logging failures.
    fn advance(&self) {
        let config = match self.config.read() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(screen = %self.screen, error = %err, "failed to read config for playlist tick");
                return;
            }
        };
        if let Err(err) = self.apply_random(config) {
            tracing::warn!(screen = %self.screen, error = %err, "failed to apply playlist wallpaper");
        }
    }
}

/// The task body of a cycling session.
pub struct SessionActor {
    rotation: Rotation,
    shared: Arc<SessionShared>,
    commands: mpsc::Receiver<SessionCommand>,
    timer: Interval,
}

impl SessionActor {
    /// Creates an actor whose first tick is one period from now.
    ///
    /// The period is taken from `shared`. Must be called within a tokio runtime.
    pub fn new(
        rotation: Rotation,
        shared: Arc<SessionShared>,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let timer = new_timer(shared.interval());
        Self {
            rotation,
            shared,
            commands,
            timer,
        }
    }

    /// Runs until [`SessionCommand::Stop`] arrives or every sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(SessionCommand::Pause) => {
                        self.shared.paused.store(true, Ordering::SeqCst);
                        tracing::info!(screen = %self.rotation.screen, "paused playlist cycle");
                    }
                    Some(SessionCommand::Resume) => {
                        self.shared.paused.store(false, Ordering::SeqCst);
                        tracing::info!(screen = %self.rotation.screen, "resumed playlist cycle");
                    }
                    Some(SessionCommand::Retarget(interval)) => {
                        let interval = interval.max(MIN_CYCLE_INTERVAL);
                        self.timer = new_timer(interval);
                        self.shared.interval_secs.store(interval.as_secs(), Ordering::SeqCst);
                        tracing::info!(screen = %self.rotation.screen, interval_secs = interval.as_secs(), "updated playlist interval");
                    }
                    Some(SessionCommand::Stop) | None => break,
                },

                _ = self.timer.tick() => {
                    if !self.shared.is_paused() {
                        self.rotation.advance();
                    }
                }
            }
        }

        tracing::debug!(screen = %self.rotation.screen, "playlist session ended");
    }
}

/// A timer whose first tick is one full period away.
fn new_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
