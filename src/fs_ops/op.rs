//! Operation and result types shared by the retry loop and the tree synchronizer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{LaunchSyncError, SyncErrorKind};

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A path relative to some root, produced by listing a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative: PathBuf,
    pub kind: EntryKind,
}

/// One independent filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOperation {
    Copy { source: PathBuf, destination: PathBuf },
    Move { source: PathBuf, destination: PathBuf },
    Delete { target: PathBuf },
    /// Create-then-delete a uniquely named file inside `target_dir`.
    WriteProbe { target_dir: PathBuf },
}

impl SyncOperation {
    pub fn copy(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        SyncOperation::Copy { source: source.into(), destination: destination.into() }
    }

    pub fn move_to(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        SyncOperation::Move { source: source.into(), destination: destination.into() }
    }

    pub fn delete(target: impl Into<PathBuf>) -> Self {
        SyncOperation::Delete { target: target.into() }
    }

    pub fn write_probe(target_dir: impl Into<PathBuf>) -> Self {
        SyncOperation::WriteProbe { target_dir: target_dir.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncOperation::Copy { .. } => "copy",
            SyncOperation::Move { .. } => "move",
            SyncOperation::Delete { .. } => "delete",
            SyncOperation::WriteProbe { .. } => "write-probe",
        }
    }

    /// The path this operation writes to (or removes).
    pub fn target(&self) -> &Path {
        match self {
            SyncOperation::Copy { destination, .. } | SyncOperation::Move { destination, .. } => destination,
            SyncOperation::Delete { target } => target,
            SyncOperation::WriteProbe { target_dir } => target_dir,
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Copy { source, destination } | SyncOperation::Move { source, destination } => {
                write!(f, "{} '{}' -> '{}'", self.name(), source.display(), destination.display())
            }
            _ => write!(f, "{} '{}'", self.name(), self.target().display()),
        }
    }
}

/// Bounded retry policy: fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, backoff: DEFAULT_BACKOFF }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        // Zero attempts would never run the operation at all.
        Self { max_attempts: max_attempts.max(1), backoff }
    }
}

/// Failure of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    pub kind: SyncErrorKind,
    pub detail: String,
}

impl AttemptError {
    pub fn new(kind: SyncErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    pub fn verification(detail: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::VerificationFailed, detail)
    }
}

impl From<std::io::Error> for AttemptError {
    fn from(e: std::io::Error) -> Self {
        Self::new(super::helpers::classify(&e), e.to_string())
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.detail)
    }
}

/// Outcome of one operation after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub succeeded: bool,
    pub attempts: u32,
    pub last_error: Option<SyncErrorKind>,
    /// Message of the last observed failure, for operator diagnostics.
    pub detail: Option<String>,
}

impl SyncResult {
    pub fn success(attempts: u32) -> Self {
        Self { succeeded: true, attempts, last_error: None, detail: None }
    }

    pub fn failure(attempts: u32, err: AttemptError) -> Self {
        Self { succeeded: false, attempts, last_error: Some(err.kind), detail: Some(err.detail) }
    }

    /// Convert into a typed error naming the operation.
    pub fn into_result(self, op: &SyncOperation) -> Result<u32, LaunchSyncError> {
        if self.succeeded {
            return Ok(self.attempts);
        }
        Err(LaunchSyncError::OperationFailed {
            op: op.name(),
            target: op.target().to_path_buf(),
            kind: self.last_error.unwrap_or(SyncErrorKind::Io),
            attempts: self.attempts,
            detail: self.detail.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_never_allows_zero_attempts() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::default().max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn failed_result_maps_to_operation_failed() {
        let op = SyncOperation::copy("/a", "/b");
        let res = SyncResult::failure(5, AttemptError::new(SyncErrorKind::PermissionDenied, "locked"));
        match res.into_result(&op) {
            Err(LaunchSyncError::OperationFailed { op, target, kind, attempts, detail }) => {
                assert_eq!(op, "copy");
                assert_eq!(target, PathBuf::from("/b"));
                assert_eq!(kind, SyncErrorKind::PermissionDenied);
                assert_eq!(attempts, 5);
                assert_eq!(detail, "locked");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
