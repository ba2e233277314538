//! Shell-like path expansion.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Absolute and relative paths are returned unchanged. Surrounding whitespace
/// is trimmed and an empty input yields an empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Joins `child` under `base`, returning it only if it is an existing directory.
#[must_use]
pub fn existing_dir(base: &Path, child: &str) -> Option<PathBuf> {
    let candidate = base.join(child);
    candidate.is_dir().then_some(candidate)
}
