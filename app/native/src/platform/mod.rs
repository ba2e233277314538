//! Linux platform abstractions for wallpaperd.
//!
//! - [`display`] - Connected output enumeration and change polling
//! - [`window`] - Foreground window fullscreen state
//! - [`path`] - Shell-like path expansion

pub mod display;
pub mod path;
pub mod window;

pub use display::{DisplayError, DisplayProvider, StaticDisplays, XrandrDisplays};
pub use window::{WindowStateQuery, XpropWindowQuery};
