//! Workshop directory watcher.
//!
//! Steam adds and removes wallpaper folders while the daemon runs. Bursts of
//! filesystem events are collapsed into one notification carrying the last
//! event, delivered once the directory has been quiet for the debounce period.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::LibraryError;
use crate::constants::LIBRARY_DEBOUNCE;

/// What happened to a workshop entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEventKind {
    /// A folder or file appeared.
    Created,
    /// A folder or file disappeared.
    Removed,
    /// A folder or file was renamed.
    Renamed,
}

/// A debounced change in the workshop directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEvent {
    /// Path of the entry that changed.
    pub path: PathBuf,
    /// Kind of change.
    pub kind: LibraryEventKind,
}

impl LibraryEvent {
    /// Folder name of the changed entry, which is the wallpaper id for
    /// top-level entries.
    #[must_use]
    pub fn folder_name(&self) -> Option<&str> { self.path.file_name().and_then(|name| name.to_str()) }
}

/// Watches a workshop directory until dropped.
pub struct LibraryWatcher {
    _watcher: RecommendedWatcher,
}

impl LibraryWatcher {
    /// Starts watching `dir` with the default debounce period.
    ///
    /// `on_change` runs on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Watch`] if the watcher cannot be created or
    /// `dir` cannot be watched.
    pub fn spawn<F>(dir: &Path, on_change: F) -> Result<Self, LibraryError>
    where
        F: Fn(LibraryEvent) + Send + 'static,
    {
        Self::with_debounce(dir, LIBRARY_DEBOUNCE, on_change)
    }

    /// Starts watching `dir`, delivering at most one event per quiet period.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Watch`] if the watcher cannot be created or
    /// `dir` cannot be watched.
    pub fn with_debounce<F>(dir: &Path, debounce: Duration, on_change: F) -> Result<Self, LibraryError>
    where
        F: Fn(LibraryEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        std::thread::Builder::new()
            .name("library-watcher".to_string())
            .spawn(move || debounce_loop(&rx, debounce, &on_change))
            .map_err(|err| LibraryError::Watch(notify::Error::io(err)))?;

        tracing::info!(dir = %dir.display(), "watching wallpaper directory");
        Ok(Self { _watcher: watcher })
    }
}

fn debounce_loop<F>(rx: &mpsc::Receiver<notify::Result<Event>>, debounce: Duration, on_change: &F)
where
    F: Fn(LibraryEvent),
{
    let mut pending: Option<(LibraryEvent, Instant)> = None;

    loop {
        let received = match &pending {
            Some((_, deadline)) => {
                rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Ok(event)) => {
                if let Some(change) = classify(&event) {
                    pending = Some((change, Instant::now() + debounce));
                }
            }
            Ok(Err(err)) => tracing::warn!(error = %err, "wallpaper directory watch error"),
            Err(RecvTimeoutError::Timeout) => {
                if let Some((change, _)) = pending.take() {
                    tracing::info!(path = %change.path.display(), kind = ?change.kind, "wallpaper directory changed");
                    on_change(change);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Maps a raw notify event to a library change, ignoring content edits.
fn classify(event: &Event) -> Option<LibraryEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => LibraryEventKind::Created,
        EventKind::Remove(_) => LibraryEventKind::Removed,
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => LibraryEventKind::Removed,
            RenameMode::To => LibraryEventKind::Created,
            _ => LibraryEventKind::Renamed,
        },
        _ => return None,
    };
    let path = event.paths.first()?.clone();
    Some(LibraryEvent { path, kind })
}
