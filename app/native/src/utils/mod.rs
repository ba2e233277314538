//! Small helpers shared by the CLI and the daemon.

pub mod command;
