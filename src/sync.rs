//! Tree synchronization.
//!
//! Copies each immediate child of a source root onto `dest_root/<name>` through the
//! retrying copy, in name order, stopping at the first child that cannot be written.
//! Every child is overwritten unconditionally; nothing is diffed or skipped, and
//! destination entries with no counterpart in the source are left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use walkdir::WalkDir;

use crate::errors::{LaunchSyncError, SyncErrorKind};
use crate::events::ProgressSink;
use crate::fs_ops::{
    EntryKind, FileEntry, RetryPolicy, SyncOperation, classify, io_error_with_help_io, perform,
};

/// Aggregate result of one tree synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSyncResult {
    pub succeeded: bool,
    /// Attempts summed over all children that were tried.
    pub attempts: u32,
    /// Children written, in order.
    pub synced: Vec<PathBuf>,
    /// Child that stopped the run.
    pub failed_entry: Option<PathBuf>,
    pub last_error: Option<SyncErrorKind>,
    pub detail: Option<String>,
}

impl TreeSyncResult {
    /// Convert a failed run into `SyncAborted` naming the offending entry.
    pub fn into_result(self) -> Result<Self, LaunchSyncError> {
        if self.succeeded {
            return Ok(self);
        }
        Err(LaunchSyncError::SyncAborted {
            entry: self.failed_entry.unwrap_or_default(),
            kind: self.last_error.unwrap_or(SyncErrorKind::Io),
            attempts: self.attempts,
            detail: self.detail.unwrap_or_default(),
        })
    }
}

fn entry_kind(ft: fs::FileType) -> EntryKind {
    if ft.is_dir() { EntryKind::Directory } else { EntryKind::File }
}

/// Immediate children of `root`, sorted by name.
pub fn list_children(root: &Path) -> io::Result<Vec<FileEntry>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error_with_help_io("list directory", root))? {
        let entry = entry?;
        // Follow links; a dangling link keeps its own type and fails later at copy time.
        let kind = match fs::metadata(entry.path()) {
            Ok(m) => entry_kind(m.file_type()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => entry_kind(entry.file_type()?),
            Err(e) => return Err(io_error_with_help_io("stat entry", &entry.path())(e)),
        };
        out.push(FileEntry { relative: PathBuf::from(entry.file_name()), kind });
    }
    out.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(out)
}

/// Every entry below `root` (directories and files), relative to `root`, sorted.
pub fn list_tree(root: &Path) -> io::Result<Vec<FileEntry>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error().unwrap_or_else(|| io::Error::other("filesystem loop detected"))
        })?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io::Error::other(e.to_string()))?
            .to_path_buf();
        out.push(FileEntry { relative, kind: entry_kind(entry.file_type()) });
    }
    Ok(out)
}

/// Copy every child of `source_root` into `dest_root`, fail-fast.
pub fn sync_tree<S: ProgressSink>(
    source_root: &Path,
    dest_root: &Path,
    policy: RetryPolicy,
    sink: &mut S,
) -> TreeSyncResult {
    let mut result = TreeSyncResult {
        succeeded: true,
        attempts: 0,
        synced: Vec::new(),
        failed_entry: None,
        last_error: None,
        detail: None,
    };

    let children = match list_children(source_root) {
        Ok(c) => c,
        Err(e) => {
            error!(src = %source_root.display(), error = %e, "cannot list source tree");
            result.succeeded = false;
            result.failed_entry = Some(source_root.to_path_buf());
            result.last_error = Some(classify(&e));
            result.detail = Some(e.to_string());
            return result;
        }
    };

    for child in children {
        let op = SyncOperation::copy(source_root.join(&child.relative), dest_root.join(&child.relative));
        let res = perform(&op, policy);
        result.attempts += res.attempts;
        if !res.succeeded {
            error!(
                entry = %child.relative.display(),
                attempts = res.attempts,
                kind = ?res.last_error,
                "synchronization aborted"
            );
            result.succeeded = false;
            result.failed_entry = Some(child.relative);
            result.last_error = res.last_error;
            result.detail = res.detail;
            return result;
        }
        sink.progress(format!("Copied {}", child.relative.display()));
        result.synced.push(child.relative);
    }

    info!(
        src = %source_root.display(),
        dest = %dest_root.display(),
        entries = result.synced.len(),
        "tree synchronized"
    );
    result
}
