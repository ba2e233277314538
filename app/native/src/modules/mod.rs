//! Feature modules for wallpaperd.
//!
//! - [`fullscreen`] - Pauses playlist cycling while a fullscreen window is focused
//! - [`library`] - Installed wallpaper discovery and directory watching
//! - [`playlist`] - Wallpaper Engine playlists and per-screen cycling
//! - [`renderer`] - Desired-state reconciliation and renderer processes

pub mod fullscreen;
pub mod library;
pub mod playlist;
pub mod renderer;
