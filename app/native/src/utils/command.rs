//! Executable lookup.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::EXTRA_PATHS_ENV;

/// Errors returned by [`resolve_binary`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The binary name was empty.
    #[error("binary name cannot be empty")]
    EmptyName,
    /// An explicit path exists but cannot be executed.
    #[error("binary at {} is not executable", .0.display())]
    NotExecutable(PathBuf),
    /// No search directory holds an executable with this name.
    #[error("unable to locate executable '{0}' in known search paths")]
    NotFound(String),
}

/// Resolves `binary` to the absolute path of an executable.
///
/// Paths containing a separator are checked as given. Bare names are looked
/// up in order in:
/// 1. the colon-separated directories in `WALLPAPERD_EXTRA_PATHS`,
/// 2. `PATH`,
/// 3. `/usr/local/bin`, `/usr/bin`, `~/.local/bin` and `~/.cargo/bin`.
///
/// # Errors
///
/// Returns an error if the name is empty or nothing executable is found.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, ResolveError> {
    let binary = binary.trim();
    if binary.is_empty() {
        return Err(ResolveError::EmptyName);
    }

    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(ResolveError::NotExecutable(candidate.to_path_buf()))
        };
    }

    search_paths()
        .into_iter()
        .filter(|directory| !directory.as_os_str().is_empty())
        .map(|directory| directory.join(binary))
        .find(|path| is_executable(path))
        .ok_or_else(|| ResolveError::NotFound(binary.to_string()))
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(extra) = env::var(EXTRA_PATHS_ENV) {
        paths.extend(extra.split(':').map(PathBuf::from));
    }

    if let Some(path_var) = env::var_os("PATH") {
        paths.extend(env::split_paths(&path_var));
    }

    paths.extend([PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")]);

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".local/bin"));
        paths.push(home.join(".cargo/bin"));
    }

    paths
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    #[test]
    fn returns_err_for_empty_binary() {
        assert_eq!(resolve_binary("  "), Err(ResolveError::EmptyName));
    }

    #[test]
    fn finds_shell_on_path() {
        let path = resolve_binary("sh").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("sh"));
    }

    #[test]
    fn fails_for_nonexistent() {
        assert!(matches!(
            resolve_binary("nonexistent_binary_12345"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn explicit_path_must_be_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("linux-wallpaperengine");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();

        let path = script.to_string_lossy().into_owned();
        assert!(matches!(resolve_binary(&path), Err(ResolveError::NotExecutable(_))));

        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(resolve_binary(&path).unwrap(), script);
    }
}
