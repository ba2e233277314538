//! Fullscreen pause detection.
//!
//! Polls the foreground window and reports transitions into and out of
//! fullscreen, so playlist cycling can be paused while something covers the
//! desktop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::config::ConfigStore;
use crate::constants::FULLSCREEN_POLL_INTERVAL;
use crate::platform::WindowStateQuery;

/// Last reported fullscreen state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenState {
    fullscreen: bool,
}

impl FullscreenState {
    /// Records one observation and returns the new state if it changed.
    ///
    /// With `enabled` false the observation counts as not-fullscreen.
    pub const fn observe(&mut self, enabled: bool, detected: bool) -> Option<bool> {
        let current = enabled && detected;
        if current == self.fullscreen {
            return None;
        }
        self.fullscreen = current;
        Some(current)
    }

    /// Whether the last observation was fullscreen.
    #[must_use]
    pub const fn is_fullscreen(&self) -> bool { self.fullscreen }
}

/// Aborts the polling task when dropped.
#[derive(Debug)]
pub struct DetectorHandle(JoinHandle<()>);

impl Drop for DetectorHandle {
    fn drop(&mut self) { self.0.abort(); }
}

/// Polls a [`WindowStateQuery`] and reports fullscreen transitions.
pub struct FullscreenDetector {
    config: Arc<dyn ConfigStore>,
    query: Arc<dyn WindowStateQuery>,
    poll_interval: Duration,
}

impl FullscreenDetector {
    /// Creates a detector polling every two seconds.
    pub fn new(config: Arc<dyn ConfigStore>, query: Arc<dyn WindowStateQuery>) -> Self {
        Self {
            config,
            query,
            poll_interval: FULLSCREEN_POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Starts polling. `on_change` receives `true` on entering fullscreen and
    /// `false` on leaving it.
    ///
    /// Polling stops when the returned handle is dropped.
    pub fn spawn<F, Fut>(self, on_change: F) -> DetectorHandle
    where
        F: Fn(bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        DetectorHandle(tokio::spawn(async move {
            let mut state = FullscreenState::default();
            let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(change) = self.poll(&mut state).await else {
                    continue;
                };
                tracing::info!(fullscreen = change, "fullscreen state changed");
                on_change(change).await;
            }
        }))
    }

    async fn poll(&self, state: &mut FullscreenState) -> Option<bool> {
        let config = match self.config.read() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(error = %err, "skipping fullscreen poll");
                return None;
            }
        };

        let enabled = !config.no_fullscreen_pause;
        let detected = if enabled {
            let query = Arc::clone(&self.query);
            tokio::task::spawn_blocking(move || query.is_fullscreen_active())
                .await
                .unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "window state query task failed");
                    false
                })
        } else {
            false
        };

        state.observe(enabled, detected)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::config::{AppConfig, MemoryConfigStore};

    #[test]
    fn test_observe_reports_transitions_only() {
        let mut state = FullscreenState::default();
        assert_eq!(state.observe(true, false), None);
        assert_eq!(state.observe(true, true), Some(true));
        assert_eq!(state.observe(true, true), None);
        assert_eq!(state.observe(true, false), Some(false));
        assert!(!state.is_fullscreen());
    }

    #[test]
    fn test_observe_disabled_forces_not_fullscreen() {
        let mut state = FullscreenState::default();
        assert_eq!(state.observe(true, true), Some(true));
        assert_eq!(state.observe(false, true), Some(false));
        assert_eq!(state.observe(false, true), None);
    }

    #[derive(Default)]
    struct ToggleQuery(AtomicBool);

    impl WindowStateQuery for ToggleQuery {
        fn is_fullscreen_active(&self) -> bool { self.0.load(Ordering::SeqCst) }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_detector_notifies_on_change() {
        let query = Arc::new(ToggleQuery::default());
        let config = Arc::new(MemoryConfigStore::new(AppConfig::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = FullscreenDetector::new(config, Arc::clone(&query) as Arc<dyn WindowStateQuery>)
            .with_poll_interval(Duration::from_millis(10))
            .spawn(move |fullscreen| {
                let sink = Arc::clone(&sink);
                async move { sink.lock().push(fullscreen) }
            });

        tokio::time::sleep(Duration::from_millis(60)).await;
        query.0.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        query.0.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(handle);

        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_detector_disabled_by_config() {
        let query = Arc::new(ToggleQuery(AtomicBool::new(true)));
        let config = Arc::new(MemoryConfigStore::new(AppConfig {
            no_fullscreen_pause: true,
            ..AppConfig::default()
        }));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = FullscreenDetector::new(config, query)
            .with_poll_interval(Duration::from_millis(10))
            .spawn(move |fullscreen| {
                let sink = Arc::clone(&sink);
                async move { sink.lock().push(fullscreen) }
            });

        tokio::time::sleep(Duration::from_millis(80)).await;
        drop(handle);

        assert!(seen.lock().is_empty());
    }
}
