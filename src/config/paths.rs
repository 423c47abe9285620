//! Default path helpers and symlink checks.
//! Settings live next to the executable (portable install); logs go to the OS data dir.

use anyhow::{Context, Result};
use dirs::{data_dir, home_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{LEGACY_FILE_NAME, SETTINGS_ENV, SETTINGS_FILE_NAME};

fn exe_dir() -> Option<PathBuf> {
    env::current_exe().ok()?.parent().map(Path::to_path_buf)
}

/// Settings file location: `LAUNCH_SYNC_CONFIG` if set, else next to the executable.
/// A directory given via the env var gets the default file name appended.
pub fn default_settings_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(SETTINGS_ENV) {
        let p = PathBuf::from(raw);
        if p.as_os_str().is_empty() {
            anyhow::bail!("{SETTINGS_ENV} is set but empty");
        }
        return Ok(if p.is_dir() { p.join(SETTINGS_FILE_NAME) } else { p });
    }
    let dir = exe_dir().context("cannot determine executable directory")?;
    Ok(dir.join(SETTINGS_FILE_NAME))
}

/// Legacy key=value file expected beside `settings_path`.
pub fn legacy_settings_path(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(LEGACY_FILE_NAME)
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Option<PathBuf> {
    if let Some(mut base) = data_dir() {
        base.push("launch_sync");
        // best-effort
        let _ = fs::create_dir_all(&base);
        base.push("launch_sync.log");
        Some(base)
    } else {
        home_dir().map(|h| h.join(".local").join("share").join("launch_sync").join("launch_sync.log"))
    }
}

/// Shipped resources sit beside the executable.
pub fn default_resource_dir() -> PathBuf {
    exe_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(windows)]
pub fn default_installation_dir() -> PathBuf {
    PathBuf::from(r"C:\Program Files (x86)\Steam\steamapps\common\ELDEN RING NIGHTREIGN\Game")
}

#[cfg(not(windows))]
pub fn default_installation_dir() -> PathBuf {
    default_steam_dir()
        .join("steamapps")
        .join("common")
        .join("ELDEN RING NIGHTREIGN")
        .join("Game")
}

#[cfg(windows)]
pub fn default_steam_dir() -> PathBuf {
    PathBuf::from(r"C:\Program Files (x86)\Steam")
}

#[cfg(not(windows))]
pub fn default_steam_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".steam")
        .join("steam")
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn env_override_accepts_file_or_directory() {
        let td = tempdir().unwrap();
        let file = td.path().join("custom.xml");
        unsafe { env::set_var(SETTINGS_ENV, &file) };
        assert_eq!(default_settings_path().unwrap(), file);

        unsafe { env::set_var(SETTINGS_ENV, td.path()) };
        assert_eq!(default_settings_path().unwrap(), td.path().join(SETTINGS_FILE_NAME));
        unsafe { env::remove_var(SETTINGS_ENV) };
    }

    #[test]
    fn legacy_file_is_a_sibling() {
        let p = Path::new("/opt/launcher/launch_sync.xml");
        assert_eq!(legacy_settings_path(p), PathBuf::from("/opt/launcher").join(LEGACY_FILE_NAME));
    }

    #[cfg(unix)]
    #[test]
    fn detects_symlinked_ancestor() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("f.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("f.log")).unwrap());
    }
}
