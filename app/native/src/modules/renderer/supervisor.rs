//! Renderer process supervision.
//!
//! The supervisor owns the screen to process map. Every renderer runs through
//! `sh -c` in its own process group so a stop takes down the renderer and any
//! helpers it spawned. Stops signal and return; the exit is observed by the
//! reaper task registered at spawn time.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::{Pid, getpgid};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use super::command::DesiredRender;
use crate::constants::RENDERER_LOG_TARGET;

/// A running renderer.
#[derive(Debug, Clone)]
struct ActiveProcess {
    pid: u32,
    command: String,
    /// Spawn counter value, so a late reap never removes a replacement.
    instance: u64,
}

type ProcessMap = Arc<Mutex<HashMap<String, ActiveProcess>>>;

/// Owns renderer child processes, at most one per screen.
#[derive(Debug, Default)]
pub struct Supervisor {
    processes: ProcessMap,
    next_instance: AtomicU64,
}

impl Supervisor {
    /// Creates an empty supervisor.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Converges the running processes onto `desired`.
    ///
    /// Screens missing from `desired` are stopped. Screens whose command is
    /// unchanged are left alone; changed ones are stopped and restarted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reconcile(&self, desired: &[DesiredRender]) {
        let mut processes = self.processes.lock();

        let wanted: HashSet<&str> = desired.iter().map(|render| render.screen.as_str()).collect();
        let stale: Vec<String> =
            processes.keys().filter(|screen| !wanted.contains(screen.as_str())).cloned().collect();
        for screen in stale {
            stop_locked(&mut processes, &screen);
        }

        for render in desired {
            if let Some(active) = processes.get(&render.screen) {
                if active.command == render.command {
                    tracing::debug!(screen = %render.screen, "renderer already running");
                    continue;
                }
                tracing::info!(screen = %render.screen, "renderer command changed, restarting");
                stop_locked(&mut processes, &render.screen);
            }

            self.spawn_locked(&mut processes, render);
        }
    }

    /// Stops the renderer on `screen`. Returns `false` if none was running.
    pub fn stop(&self, screen: &str) -> bool {
        let mut processes = self.processes.lock();
        stop_locked(&mut processes, screen)
    }

    /// Stops every renderer whose command takes `wallpaper` as an argument.
    ///
    /// An argument matches when it equals `wallpaper` or ends in `/<wallpaper>`,
    /// so both folder names and full paths are caught. Returns the number stopped.
    pub fn stop_matching(&self, wallpaper: &str) -> usize {
        if wallpaper.is_empty() {
            return 0;
        }
        let suffix = format!("/{wallpaper}");

        let mut processes = self.processes.lock();
        let matching: Vec<String> = processes
            .iter()
            .filter(|(_, active)| {
                active
                    .command
                    .split_whitespace()
                    .any(|arg| arg == wallpaper || arg.ends_with(&suffix))
            })
            .map(|(screen, _)| screen.clone())
            .collect();

        for screen in &matching {
            tracing::info!(screen = %screen, wallpaper, "stopping renderer for removed wallpaper");
            stop_locked(&mut processes, screen);
        }
        matching.len()
    }

    /// Stops every tracked renderer, then sweeps stray `process_name` instances.
    ///
    /// Returns the number of tracked renderers that were signalled. The sweep
    /// is best effort.
    pub fn kill_all(&self, process_name: &str) -> usize {
        let stopped = {
            let mut processes = self.processes.lock();
            let screens: Vec<String> = processes.keys().cloned().collect();
            screens.iter().filter(|screen| stop_locked(&mut processes, screen)).count()
        };

        if !process_name.is_empty() {
            match std::process::Command::new("killall")
                .args(["-e", process_name])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) if !status.success() => {
                    tracing::debug!(process_name, %status, "killall found nothing to kill");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(process_name, error = %err, "failed to run killall"),
            }
        }

        stopped
    }

    /// Screens with a running renderer, sorted.
    #[must_use]
    pub fn active_screens(&self) -> Vec<String> {
        let mut screens: Vec<String> = self.processes.lock().keys().cloned().collect();
        screens.sort();
        screens
    }

    /// Command line of the renderer on `screen`.
    #[must_use]
    pub fn command_for(&self, screen: &str) -> Option<String> {
        self.processes.lock().get(screen).map(|active| active.command.clone())
    }

    /// Process id of the renderer on `screen`.
    #[must_use]
    pub fn pid_for(&self, screen: &str) -> Option<u32> {
        self.processes.lock().get(screen).map(|active| active.pid)
    }

    fn spawn_locked(&self, processes: &mut HashMap<String, ActiveProcess>, render: &DesiredRender) {
        tracing::info!(screen = %render.screen, command = %render.command, "starting renderer");

        let mut child = match Command::new("sh")
            .arg("-c")
            .arg(&render.command)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(screen = %render.screen, error = %err, "failed to spawn renderer");
                return;
            }
        };

        let Some(pid) = child.id() else {
            tracing::error!(screen = %render.screen, "renderer exited before it could be tracked");
            return;
        };

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(render.screen.clone(), stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(render.screen.clone(), stderr));
        }

        let instance = self.next_instance.fetch_add(1, Ordering::Relaxed) + 1;
        processes.insert(render.screen.clone(), ActiveProcess {
            pid,
            command: render.command.clone(),
            instance,
        });

        tokio::spawn(reap(Arc::clone(&self.processes), render.screen.clone(), instance, child));
    }
}

/// Signals the process group of `screen` and drops its entry.
fn stop_locked(processes: &mut HashMap<String, ActiveProcess>, screen: &str) -> bool {
    let Some(active) = processes.remove(screen) else {
        return false;
    };

    tracing::info!(screen, pid = active.pid, "stopping renderer");
    let Ok(raw) = i32::try_from(active.pid) else {
        tracing::warn!(screen, pid = active.pid, "pid out of range, cannot signal");
        return true;
    };
    let pid = Pid::from_raw(raw);

    match getpgid(Some(pid)) {
        Ok(pgid) => {
            if let Err(err) = killpg(pgid, Signal::SIGTERM) {
                tracing::warn!(screen, error = %err, "failed to signal renderer process group");
            }
        }
        Err(_) => {
            if let Err(err) = kill(pid, Signal::SIGKILL) {
                tracing::warn!(screen, error = %err, "failed to kill renderer");
            }
        }
    }
    true
}

async fn reap(processes: ProcessMap, screen: String, instance: u64, mut child: Child) {
    match child.wait().await {
        Ok(status) if status.success() => tracing::debug!(screen = %screen, "renderer exited"),
        Ok(status) => tracing::info!(screen = %screen, %status, "renderer exited"),
        Err(err) => tracing::warn!(screen = %screen, error = %err, "failed to wait for renderer"),
    }

    let mut processes = processes.lock();
    if processes.get(&screen).is_some_and(|active| active.instance == instance) {
        processes.remove(&screen);
    }
}

async fn forward_output<R>(screen: String, reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end();
                if !text.is_empty() {
                    tracing::info!(target: RENDERER_LOG_TARGET, screen = %screen, "{text}");
                }
            }
            Err(err) => {
                tracing::debug!(screen = %screen, error = %err, "renderer output closed");
                break;
            }
        }
    }
}
