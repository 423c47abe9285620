//! Typed error definitions for launch_sync.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a single failed file operation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// Locked file, sharing violation or missing privileges.
    PermissionDenied,
    /// Source or destination missing at a step that required it.
    NotFound,
    /// Any other OS-level failure.
    Io,
    /// The operation returned without error but its post-condition did not hold.
    VerificationFailed,
}

impl SyncErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncErrorKind::PermissionDenied => "permission_denied",
            SyncErrorKind::NotFound => "not_found",
            SyncErrorKind::Io => "io_error",
            SyncErrorKind::VerificationFailed => "verification_failed",
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LaunchSyncError {
    #[error("No original backup at {backup}; run the update or patch step first to create a base state")]
    BackupMissing { backup: PathBuf },

    #[error("{candidate} is not a game installation ({marker} not found)")]
    NotAnInstallation { candidate: PathBuf, marker: String },

    #[error("Source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("{op} on {target} failed after {attempts} attempt(s) [{kind}]: {detail}")]
    OperationFailed {
        op: &'static str,
        target: PathBuf,
        kind: SyncErrorKind,
        attempts: u32,
        detail: String,
    },

    #[error("Synchronization aborted at '{entry}' after {attempts} attempt(s) [{kind}]: {detail}")]
    SyncAborted {
        entry: PathBuf,
        kind: SyncErrorKind,
        attempts: u32,
        detail: String,
    },

    #[error("Setting '{key}' not found in {file}")]
    SettingMissing { key: String, file: PathBuf },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl LaunchSyncError {
    /// Stable numeric code for structured logs and exit statuses.
    pub fn code(&self) -> u16 {
        match self {
            LaunchSyncError::BackupMissing { .. } => 10,
            LaunchSyncError::NotAnInstallation { .. } => 11,
            LaunchSyncError::SourceMissing(_) => 12,
            LaunchSyncError::OperationFailed { .. } => 20,
            LaunchSyncError::SyncAborted { .. } => 21,
            LaunchSyncError::SettingMissing { .. } => 30,
            LaunchSyncError::InvalidSetting(_) => 31,
        }
    }

    /// Underlying file-operation classification, if any.
    pub fn kind(&self) -> Option<SyncErrorKind> {
        match self {
            LaunchSyncError::OperationFailed { kind, .. }
            | LaunchSyncError::SyncAborted { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
