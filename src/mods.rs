//! Payload swap with a one-time backup of the file it replaces.
//!
//! The first apply copies whatever currently sits at the live path into
//! `<install>/backups/original/<payload>`; later applies never touch that backup.
//! Reset copies the backup back over the live file.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::{LaunchSyncError, SyncErrorKind};
use crate::fs_ops::{RetryPolicy, SyncOperation, perform};

/// File swapped by mods.
pub const PAYLOAD_FILE: &str = "regulation.bin";
/// Backup location relative to the installation root.
pub const BACKUP_SUBDIR: [&str; 2] = ["backups", "original"];

/// What `apply_payload` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// This call captured the original.
    pub backup_created: bool,
    /// Attempts spent on the payload copy.
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct ModApplier {
    payload_name: String,
    policy: RetryPolicy,
}

impl ModApplier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_payload_name(PAYLOAD_FILE, policy)
    }

    pub fn with_payload_name(name: impl Into<String>, policy: RetryPolicy) -> Self {
        Self { payload_name: name.into(), policy }
    }

    pub fn payload_name(&self) -> &str {
        &self.payload_name
    }

    pub fn live_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.payload_name)
    }

    pub fn backup_path(&self, install_dir: &Path) -> PathBuf {
        let mut p = install_dir.to_path_buf();
        p.extend(BACKUP_SUBDIR);
        p.push(&self.payload_name);
        p
    }

    pub fn has_backup(&self, install_dir: &Path) -> bool {
        self.backup_path(install_dir).is_file()
    }

    /// Capture the original on first use, then overwrite the live file with `payload_file`.
    pub fn apply_payload(&self, payload_file: &Path, install_dir: &Path) -> Result<ApplyOutcome, LaunchSyncError> {
        let live = self.live_path(install_dir);
        let backup = self.backup_path(install_dir);

        let mut backup_created = false;
        if !backup.is_file() {
            if live.is_file() {
                let op = SyncOperation::copy(&live, &backup);
                perform(&op, self.policy).into_result(&op)?;
                info!(backup = %backup.display(), "original payload backed up");
                backup_created = true;
            } else {
                // Nothing to capture; a later reset reports BackupMissing.
                warn!(live = %live.display(), "no live payload to back up");
            }
        }

        // The retrying copy re-checks the payload on every attempt.
        let op = SyncOperation::copy(payload_file, &live);
        let res = perform(&op, self.policy);
        if res.last_error == Some(SyncErrorKind::NotFound) && !payload_file.exists() {
            return Err(LaunchSyncError::SourceMissing(payload_file.to_path_buf()));
        }
        let attempts = res.into_result(&op)?;
        info!(payload = %payload_file.display(), live = %live.display(), "payload applied");
        Ok(ApplyOutcome { backup_created, attempts })
    }

    /// Restore the captured original. Not retried when no backup exists.
    pub fn reset_to_original(&self, install_dir: &Path) -> Result<u32, LaunchSyncError> {
        let backup = self.backup_path(install_dir);
        if !backup.is_file() {
            return Err(LaunchSyncError::BackupMissing { backup });
        }
        let live = self.live_path(install_dir);
        let op = SyncOperation::copy(&backup, &live);
        let attempts = perform(&op, self.policy).into_result(&op)?;
        info!(live = %live.display(), "original payload restored");
        Ok(attempts)
    }
}
