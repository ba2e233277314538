//! Foreground window state queries.

use std::process::Command;

/// Answers whether the focused window is fullscreen.
pub trait WindowStateQuery: Send + Sync {
    /// Returns `true` if the active window is fullscreen. Failures count as `false`.
    fn is_fullscreen_active(&self) -> bool;
}

/// Window state from the EWMH root properties, read with `xprop`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XpropWindowQuery;

impl WindowStateQuery for XpropWindowQuery {
    fn is_fullscreen_active(&self) -> bool {
        let Some(active) = xprop(&["-root", "_NET_ACTIVE_WINDOW"]) else {
            return false;
        };
        let Some(window_id) = parse_active_window(&active) else {
            return false;
        };
        xprop(&["-id", &window_id, "_NET_WM_STATE"]).is_some_and(|state| has_fullscreen_state(&state))
    }
}

fn xprop(args: &[&str]) -> Option<String> {
    let output = Command::new("xprop").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Extracts the window id from `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x2e00006`.
///
/// Returns `None` when nothing is focused (`0x0`).
#[must_use]
pub fn parse_active_window(output: &str) -> Option<String> {
    let (_, id) = output.split_once('#')?;
    let id = id.trim();
    // xprop may list several ids separated by commas; the first is the active one
    let id = id.split(',').next().unwrap_or(id).trim();
    (!id.is_empty() && id != "0x0").then(|| id.to_string())
}

/// Returns `true` if `_NET_WM_STATE` output contains the fullscreen atom.
#[must_use]
pub fn has_fullscreen_state(output: &str) -> bool { output.contains("_NET_WM_STATE_FULLSCREEN") }
