//! In-place edit of the co-op settings INI.
//! Only the `player_count = N` line changes; indentation, comments and every
//! other line are kept byte for byte.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::MAX_PLAYER_COUNT;
use crate::errors::{LaunchSyncError, SyncErrorKind};
use crate::fs_ops::{
    AttemptError, RetryPolicy, classify, io_error_with_help_io, retry_with_backoff, unique_temp_path,
};

pub const PLAYER_COUNT_KEY: &str = "player_count";

/// Co-op mod settings file inside an installation.
pub fn coop_settings_path(install_dir: &Path) -> PathBuf {
    install_dir.join("SeamlessCoop").join("nrsc_settings.ini")
}

fn is_key_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(PLAYER_COUNT_KEY)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Rewrite the first `player_count = ...` line. None when the key is absent.
pub fn rewrite_player_count(text: &str, count: u8) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 4);
    let mut replaced = false;
    for line in text.split_inclusive('\n') {
        if !replaced && is_key_line(line) {
            let indent_len = line.len() - line.trim_start().len();
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            out.push_str(&line[..indent_len]);
            out.push_str(&format!("{PLAYER_COUNT_KEY} = {count}{ending}"));
            replaced = true;
        } else {
            out.push_str(line);
        }
    }
    replaced.then_some(out)
}

/// Set the player count in `ini_path`. The write goes through a temp sibling and a
/// rename, retried while the game holds the file.
pub fn set_player_count(ini_path: &Path, count: u8, policy: RetryPolicy) -> Result<(), LaunchSyncError> {
    if !(1..=MAX_PLAYER_COUNT).contains(&count) {
        return Err(LaunchSyncError::InvalidSetting(format!(
            "player count {count} is outside 1..={MAX_PLAYER_COUNT}"
        )));
    }
    if !ini_path.is_file() {
        return Err(LaunchSyncError::SourceMissing(ini_path.to_path_buf()));
    }
    let text = fs::read_to_string(ini_path).map_err(|e| {
        let kind = classify(&e);
        LaunchSyncError::OperationFailed {
            op: "read",
            target: ini_path.to_path_buf(),
            kind,
            attempts: 1,
            detail: io_error_with_help_io("read settings", ini_path)(e).to_string(),
        }
    })?;
    let updated = rewrite_player_count(&text, count).ok_or_else(|| LaunchSyncError::SettingMissing {
        key: PLAYER_COUNT_KEY.to_string(),
        file: ini_path.to_path_buf(),
    })?;

    let label = format!("edit '{}'", ini_path.display());
    let res = retry_with_backoff(policy, &label, |_| write_replacing(ini_path, updated.as_bytes()));
    if !res.succeeded {
        return Err(LaunchSyncError::OperationFailed {
            op: "edit",
            target: ini_path.to_path_buf(),
            kind: res.last_error.unwrap_or(SyncErrorKind::Io),
            attempts: res.attempts,
            detail: res.detail.unwrap_or_default(),
        });
    }
    info!(path = %ini_path.display(), count, "player count updated");
    Ok(())
}

fn write_replacing(path: &Path, contents: &[u8]) -> Result<(), AttemptError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = unique_temp_path(dir, "ini");
    let written = fs::File::create(&tmp).and_then(|mut f| {
        f.write_all(contents)?;
        f.sync_all()
    });
    let result = written
        .map_err(io_error_with_help_io("write temporary settings", &tmp))
        .and_then(|_| fs::rename(&tmp, path).map_err(io_error_with_help_io("replace settings", path)));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
