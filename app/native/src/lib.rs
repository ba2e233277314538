//! wallpaperd - a headless backend for `linux-wallpaperengine`.
//!
//! The daemon keeps one renderer process per connected screen in line with a
//! JSON configuration shared with the GUI, and cycles Wallpaper Engine
//! playlists on a timer per screen.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod modules;
pub mod platform;
pub mod schema;
pub mod service;
pub mod utils;
