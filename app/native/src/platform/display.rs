//! Connected display enumeration.
//!
//! Screens are identified by their output name (`DP-1`, `HDMI-A-1`, ...) as
//! reported by `xrandr --query`.

use std::future::Future;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Errors that can occur while enumerating displays.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The enumeration tool could not be started.
    #[error("failed to run xrandr: {0}")]
    Spawn(#[from] std::io::Error),
    /// The enumeration tool exited unsuccessfully.
    #[error("xrandr exited with {status}: {stderr}")]
    Failed {
        /// Exit status as printed by the OS.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Lists the screens that are currently connected.
pub trait DisplayProvider: Send + Sync {
    /// Returns connected output names in the order the display server reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if the display server cannot be queried.
    fn connected_screens(&self) -> Result<Vec<String>, DisplayError>;
}

/// Display enumeration backed by `xrandr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XrandrDisplays;

impl DisplayProvider for XrandrDisplays {
    fn connected_screens(&self) -> Result<Vec<String>, DisplayError> {
        let output = Command::new("xrandr").arg("--query").output()?;
        if !output.status.success() {
            return Err(DisplayError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_xrandr(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Fixed list of screens, for tests and headless setups.
#[derive(Debug, Default, Clone)]
pub struct StaticDisplays(pub Vec<String>);

impl StaticDisplays {
    /// Creates a provider that always reports `screens`.
    #[must_use]
    pub fn new<I, S>(screens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(screens.into_iter().map(Into::into).collect())
    }
}

impl DisplayProvider for StaticDisplays {
    fn connected_screens(&self) -> Result<Vec<String>, DisplayError> { Ok(self.0.clone()) }
}

/// Extracts connected output names from `xrandr --query` output.
///
/// `disconnected` lines are skipped because the match requires a leading space.
#[must_use]
pub fn parse_xrandr(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(" connected"))
        .filter_map(|line| line.split(' ').next())
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Polls `provider` and calls `on_change` with the new list whenever it differs.
///
/// Query failures are skipped. The first poll only records the baseline.
pub fn spawn_display_watcher<F, Fut>(
    provider: Arc<dyn DisplayProvider>,
    period: Duration,
    on_change: F,
) -> JoinHandle<()>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut last = query(&provider).await.unwrap_or_default();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(current) = query(&provider).await else {
                continue;
            };
            if current != last {
                tracing::info!(screens = ?current, "connected displays changed");
                last.clone_from(&current);
                on_change(current).await;
            }
        }
    })
}

async fn query(provider: &Arc<dyn DisplayProvider>) -> Option<Vec<String>> {
    let provider = Arc::clone(provider);
    match tokio::task::spawn_blocking(move || provider.connected_screens()).await {
        Ok(Ok(screens)) => Some(screens),
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "display query failed");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "display query task failed");
            None
        }
    }
}
