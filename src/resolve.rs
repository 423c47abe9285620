//! Locating the game installation.
//! A directory is the installation when it contains the marker file. The chosen path is
//! probed first, then each known subdirectory in order. Existence checks only.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::LaunchSyncError;

/// Launcher executable that marks the installation root.
pub const MARKER_FILE: &str = "nrsc_launcher.exe";

/// Subdirectories probed when the chosen folder is the parent of the installation.
pub const KNOWN_SUBDIRS: &[&str] = &["Game"];

fn has_marker(dir: &Path, marker: &str) -> bool {
    dir.join(marker).is_file()
}

/// Return the directory under (or at) `candidate` that holds `marker`, if any.
/// Never falls back to `candidate` itself when nothing matches.
pub fn resolve_installation<S: AsRef<str>>(
    candidate: &Path,
    marker: &str,
    known_subdirs: &[S],
) -> Option<PathBuf> {
    if has_marker(candidate, marker) {
        debug!(path = %candidate.display(), marker, "marker found in chosen folder");
        return Some(candidate.to_path_buf());
    }
    for sub in known_subdirs {
        let dir = candidate.join(sub.as_ref());
        if has_marker(&dir, marker) {
            info!(path = %dir.display(), marker, "installation found in subdirectory");
            return Some(dir);
        }
    }
    warn!(path = %candidate.display(), marker, "not a game installation");
    None
}

/// `resolve_installation` with the default marker and subdirectories, as a typed error.
pub fn require_installation(candidate: &Path) -> Result<PathBuf, LaunchSyncError> {
    resolve_installation(candidate, MARKER_FILE, KNOWN_SUBDIRS).ok_or_else(|| {
        LaunchSyncError::NotAnInstallation {
            candidate: candidate.to_path_buf(),
            marker: MARKER_FILE.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn marker_directory_named_like_file_does_not_count() {
        let td = tempdir().unwrap();
        fs::create_dir(td.path().join("game.exe")).unwrap();
        assert_eq!(resolve_installation(td.path(), "game.exe", &["Game"]), None);
    }

    #[test]
    fn first_matching_subdir_wins() {
        let td = tempdir().unwrap();
        for sub in ["A", "B"] {
            fs::create_dir(td.path().join(sub)).unwrap();
            fs::write(td.path().join(sub).join("game.exe"), b"").unwrap();
        }
        assert_eq!(
            resolve_installation(td.path(), "game.exe", &["B", "A"]),
            Some(td.path().join("B"))
        );
    }

    #[test]
    fn require_installation_reports_marker() {
        let td = tempdir().unwrap();
        let err = require_installation(td.path()).unwrap_err();
        assert_eq!(err.code(), 11);
        assert!(err.to_string().contains(MARKER_FILE));
    }
}
