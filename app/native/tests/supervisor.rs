//! Integration tests for renderer supervision.
//!
//! These tests spawn real `sh` children, so they only need a POSIX shell and
//! `sleep` on the `PATH`.

use std::time::Duration;

use nix::sys::signal::kill;
use nix::unistd::Pid;
use wallpaperd_lib::modules::renderer::{DesiredRender, Supervisor};

// ============================================================================
// Helpers
// ============================================================================

fn render(screen: &str, command: &str) -> DesiredRender { DesiredRender::new(screen, command) }

#[allow(clippy::cast_possible_wrap)]
fn is_alive(pid: u32) -> bool { kill(Pid::from_raw(pid as i32), None).is_ok() }

/// Polls `condition` for up to two seconds.
async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..40 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

// ============================================================================
// Reconcile
// ============================================================================

/// After a reconcile the tracked screens are exactly the desired ones.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reconcile_matches_desired_set() {
    let supervisor = Supervisor::new();

    supervisor.reconcile(&[render("DP-1", "sleep 30"), render("HDMI-1", "sleep 31")]);
    assert_eq!(supervisor.active_screens(), vec!["DP-1", "HDMI-1"]);

    let hdmi = supervisor.pid_for("HDMI-1").unwrap();
    supervisor.reconcile(&[render("DP-1", "sleep 30")]);
    assert_eq!(supervisor.active_screens(), vec!["DP-1"]);
    assert!(eventually(|| !is_alive(hdmi)).await, "stopped renderer should exit");

    supervisor.kill_all("");
}

/// A changed command replaces the renderer on that screen only.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_changed_command_restarts_screen() {
    let supervisor = Supervisor::new();
    supervisor.reconcile(&[render("DP-1", "sleep 30"), render("HDMI-1", "sleep 31")]);
    let dp = supervisor.pid_for("DP-1").unwrap();
    let hdmi = supervisor.pid_for("HDMI-1").unwrap();

    supervisor.reconcile(&[render("DP-1", "sleep 30"), render("HDMI-1", "sleep 32")]);

    assert_eq!(supervisor.pid_for("DP-1"), Some(dp));
    assert_ne!(supervisor.pid_for("HDMI-1"), Some(hdmi));
    assert_eq!(supervisor.command_for("HDMI-1").as_deref(), Some("sleep 32"));
    assert!(eventually(|| !is_alive(hdmi)).await);

    supervisor.kill_all("");
}

// ============================================================================
// Stopping
// ============================================================================

/// `kill_all` signals every tracked renderer and empties the map.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_kill_all_signals_each_renderer() {
    let supervisor = Supervisor::new();
    supervisor.reconcile(&[render("A", "sleep 30"), render("B", "sleep 31")]);
    let pids = [supervisor.pid_for("A").unwrap(), supervisor.pid_for("B").unwrap()];

    assert_eq!(supervisor.kill_all(""), 2);
    assert!(supervisor.active_screens().is_empty());
    assert!(eventually(|| pids.iter().all(|pid| !is_alive(*pid))).await);
}

/// Stopping a screen ends a shell that is waiting on background children.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_kills_process_group() {
    let supervisor = Supervisor::new();
    supervisor.reconcile(&[render("DP-1", "sleep 30 & sleep 31; wait")]);
    let pid = supervisor.pid_for("DP-1").unwrap();

    assert!(supervisor.stop("DP-1"));
    assert!(!supervisor.stop("DP-1"));
    assert!(eventually(|| !is_alive(pid)).await);
}

