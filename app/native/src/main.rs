//! wallpaperd - renderer supervisor and playlist scheduler for
//! `linux-wallpaperengine`.
//!
//! Runs the daemon when called without a subcommand.

fn main() {
    if let Err(err) = wallpaperd_lib::cli::run() {
        eprintln!("wallpaperd: {err}");
        std::process::exit(1);
    }
}
