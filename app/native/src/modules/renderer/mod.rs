//! Renderer management.
//!
//! [`Reconciler`] turns configuration plus connected screens into a
//! [`DesiredRenderSet`]; [`Supervisor`] makes the running processes match it.

pub mod command;
pub mod reconciler;
pub mod supervisor;

pub use command::{DesiredRender, DesiredRenderSet, build_command};
pub use reconciler::{Reconciler, adopt_connected_screens, desired_renders};
pub use supervisor::Supervisor;

use crate::error::WallpaperdError;

/// Re-applies the configured wallpapers to the connected screens.
///
/// This is the whole reconcile pipeline as the playlist scheduler sees it.
pub trait ApplyWallpapers: Send + Sync {
    /// Runs one reconcile pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the desired state cannot be computed.
    fn apply(&self) -> Result<(), WallpaperdError>;
}
