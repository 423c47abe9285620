//! Retrying file operations.
//!
//! Each attempt is destructive-then-reconstructive:
//!   1) ensure the destination's parent exists
//!   2) remove whatever sits at the destination
//!   3) copy (or rename, for moves) the source into place
//!   4) verify the destination kind matches the source kind
//!
//! A failed attempt (lock, missing path, OS error, failed verification) sleeps for
//! the policy's fixed backoff and tries again until the attempt budget is spent.
//! Failures are returned as a `SyncResult`, never raised.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use tracing::{debug, error, info, warn};

use crate::errors::SyncErrorKind;

use super::copy::{copy_dir_recursive, remove_existing, replace_file};
use super::helpers::io_error_with_help_io;
use super::op::{AttemptError, EntryKind, RetryPolicy, SyncOperation, SyncResult};
use super::util::unique_temp_path;

/// Run `attempt` until it succeeds or `policy.max_attempts` is reached.
/// The closure receives the 1-based attempt number.
pub fn retry_with_backoff<F>(policy: RetryPolicy, label: &str, mut attempt: F) -> SyncResult
where
    F: FnMut(u32) -> Result<(), AttemptError>,
{
    let max = policy.max_attempts.max(1);
    let mut n = 1;
    loop {
        match attempt(n) {
            Ok(()) => {
                if n > 1 {
                    info!(op = label, attempts = n, "succeeded after retry");
                } else {
                    debug!(op = label, "succeeded");
                }
                return SyncResult::success(n);
            }
            Err(e) if n >= max => {
                error!(op = label, attempts = n, kind = %e.kind, error = %e.detail, "giving up");
                return SyncResult::failure(n, e);
            }
            Err(e) => {
                warn!(
                    op = label,
                    attempt = n,
                    max_attempts = max,
                    kind = %e.kind,
                    error = %e.detail,
                    backoff_ms = policy.backoff.as_millis() as u64,
                    "attempt failed; retrying"
                );
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff);
                }
                n += 1;
            }
        }
    }
}

/// Perform `op` with bounded retries.
pub fn perform(op: &SyncOperation, policy: RetryPolicy) -> SyncResult {
    if let Some(err) = reject_self_overwrite(op) {
        error!(op = %op, error = %err.detail, "refusing operation");
        return SyncResult::failure(1, err);
    }
    let label = op.to_string();
    // Set once a move's copy is verified; later attempts only retry the source removal.
    let mut staged = false;
    retry_with_backoff(policy, &label, |_| execute_once(op, &mut staged))
}

/// Step 2 would delete the source when the destination is the source, lies inside it,
/// or contains it.
fn reject_self_overwrite(op: &SyncOperation) -> Option<AttemptError> {
    let (source, destination) = match op {
        SyncOperation::Copy { source, destination } | SyncOperation::Move { source, destination } => {
            (source, destination)
        }
        _ => return None,
    };
    let src_real = dunce::canonicalize(source).unwrap_or_else(|_| source.clone());
    let dest_real = destination
        .parent()
        .and_then(|p| dunce::canonicalize(p).ok())
        .and_then(|p| destination.file_name().map(|n| p.join(n)))
        .unwrap_or_else(|| destination.clone());
    if dest_real.starts_with(&src_real) {
        return Some(AttemptError::new(
            SyncErrorKind::Io,
            format!(
                "destination '{}' is the source or lies inside it",
                destination.display()
            ),
        ));
    }
    if src_real.starts_with(&dest_real) {
        return Some(AttemptError::new(
            SyncErrorKind::Io,
            format!(
                "destination '{}' contains the source '{}'",
                destination.display(),
                source.display()
            ),
        ));
    }
    None
}

fn execute_once(op: &SyncOperation, staged: &mut bool) -> Result<(), AttemptError> {
    match op {
        SyncOperation::Copy { source, destination } => copy_once(source, destination),
        SyncOperation::Move { source, destination } => move_once(source, destination, staged),
        SyncOperation::Delete { target } => delete_once(target),
        SyncOperation::WriteProbe { target_dir } => probe_once(target_dir),
    }
}

/// Stat the source; re-checked every attempt since a scanner can hide it briefly.
fn source_kind(source: &Path) -> Result<(EntryKind, u64), AttemptError> {
    let meta = fs::metadata(source).map_err(io_error_with_help_io("stat source", source))?;
    if meta.is_dir() {
        Ok((EntryKind::Directory, 0))
    } else if meta.is_file() {
        Ok((EntryKind::File, meta.len()))
    } else {
        Err(AttemptError::new(
            SyncErrorKind::Io,
            format!("source '{}' is neither a file nor a directory", source.display()),
        ))
    }
}

fn prepare_destination(destination: &Path) -> Result<(), AttemptError> {
    if let Some(parent) = destination.parent() {
        match fs::create_dir_all(parent) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && parent.is_dir() => {}
            Err(e) => return Err(io_error_with_help_io("create destination parent", parent)(e).into()),
        }
    }
    remove_existing(destination)?;
    Ok(())
}

fn verify_destination(destination: &Path, kind: EntryKind, len: u64) -> Result<(), AttemptError> {
    let meta = fs::metadata(destination).map_err(|e| {
        AttemptError::verification(format!(
            "destination '{}' missing after write: {e}",
            destination.display()
        ))
    })?;
    match kind {
        EntryKind::File if !meta.is_file() => Err(AttemptError::verification(format!(
            "destination '{}' is not a file",
            destination.display()
        ))),
        EntryKind::File if meta.len() != len => Err(AttemptError::verification(format!(
            "destination '{}' has {} bytes, source had {len}",
            destination.display(),
            meta.len()
        ))),
        EntryKind::Directory if !meta.is_dir() => Err(AttemptError::verification(format!(
            "destination '{}' is not a directory",
            destination.display()
        ))),
        _ => Ok(()),
    }
}

fn copy_once(source: &Path, destination: &Path) -> Result<(), AttemptError> {
    let (kind, len) = source_kind(source)?;
    prepare_destination(destination)?;
    match kind {
        EntryKind::File => {
            replace_file(source, destination)?;
        }
        EntryKind::Directory => {
            copy_dir_recursive(source, destination)?;
        }
    }
    verify_destination(destination, kind, len)
}

/// `staged` means an earlier attempt already placed a verified copy at `destination`;
/// the source may be partly removed, so it must not be copied again.
fn move_once(source: &Path, destination: &Path, staged: &mut bool) -> Result<(), AttemptError> {
    if *staged {
        remove_existing(source)?;
        return Ok(());
    }
    let (kind, len) = source_kind(source)?;
    prepare_destination(destination)?;

    // Same filesystem: a rename is atomic. Otherwise copy, verify, then drop the source.
    if let Err(e) = fs::rename(source, destination) {
        debug!(src = %source.display(), dest = %destination.display(), error = %e, "rename failed; copying instead");
        match kind {
            EntryKind::File => {
                replace_file(source, destination)?;
            }
            EntryKind::Directory => {
                copy_dir_recursive(source, destination)?;
            }
        }
        verify_destination(destination, kind, len)?;
        *staged = true;
        remove_existing(source)?;
        return Ok(());
    }
    verify_destination(destination, kind, len)
}

fn delete_once(target: &Path) -> Result<(), AttemptError> {
    remove_existing(target)?;
    if fs::symlink_metadata(target).is_ok() {
        return Err(AttemptError::verification(format!(
            "'{}' still exists after delete",
            target.display()
        )));
    }
    Ok(())
}

fn probe_once(target_dir: &Path) -> Result<(), AttemptError> {
    let meta = fs::metadata(target_dir).map_err(io_error_with_help_io("stat directory", target_dir))?;
    if !meta.is_dir() {
        return Err(AttemptError::new(
            SyncErrorKind::Io,
            format!("'{}' is not a directory", target_dir.display()),
        ));
    }

    let probe = unique_temp_path(target_dir, "probe");
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .map_err(io_error_with_help_io("create probe file", &probe))?;
    let written = f.write_all(b"probe").and_then(|_| f.sync_all());
    drop(f);
    let removed = fs::remove_file(&probe);
    written.map_err(io_error_with_help_io("write probe file", &probe))?;
    removed.map_err(io_error_with_help_io("remove probe file", &probe))?;

    if probe.exists() {
        return Err(AttemptError::verification(format!(
            "probe file '{}' survived removal",
            probe.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fast() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[test]
    fn copy_file_creates_missing_parents() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        fs::write(&src, b"a").unwrap();
        let dest = td.path().join("x/y/a.txt");

        let res = perform(&SyncOperation::copy(&src, &dest), fast());
        assert!(res.succeeded);
        assert_eq!(res.attempts, 1);
        assert_eq!(fs::read(&dest).unwrap(), b"a");
    }

    #[test]
    fn copy_replaces_directory_with_file() {
        let td = tempdir().unwrap();
        let src = td.path().join("cfg");
        fs::write(&src, b"file now").unwrap();
        let dest = td.path().join("out/cfg");
        fs::create_dir_all(dest.join("old")).unwrap();

        let res = perform(&SyncOperation::copy(&src, &dest), fast());
        assert!(res.succeeded, "{res:?}");
        assert!(dest.is_file());
    }

    #[test]
    fn missing_source_exhausts_attempts_as_not_found() {
        let td = tempdir().unwrap();
        let res = perform(
            &SyncOperation::copy(td.path().join("nope"), td.path().join("dest")),
            fast(),
        );
        assert!(!res.succeeded);
        assert_eq!(res.attempts, 3);
        assert_eq!(res.last_error, Some(SyncErrorKind::NotFound));
    }

    #[test]
    fn copy_onto_itself_is_refused_without_touching_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("same.bin");
        fs::write(&src, b"keep").unwrap();

        let res = perform(&SyncOperation::copy(&src, &src), fast());
        assert!(!res.succeeded);
        assert_eq!(fs::read(&src).unwrap(), b"keep");
    }

    #[test]
    fn copy_onto_an_ancestor_of_the_source_is_refused() {
        let td = tempdir().unwrap();
        let patch = td.path().join("patch");
        fs::create_dir(&patch).unwrap();
        let src = patch.join("a.txt");
        fs::write(&src, b"a").unwrap();
        fs::write(patch.join("b.txt"), b"b").unwrap();

        let res = perform(&SyncOperation::copy(&src, &patch), fast());
        assert!(!res.succeeded);
        assert_eq!(res.attempts, 1);
        assert_eq!(fs::read(&src).unwrap(), b"a");
        assert_eq!(fs::read(patch.join("b.txt")).unwrap(), b"b");

        let res = perform(&SyncOperation::move_to(&src, td.path()), fast());
        assert!(!res.succeeded);
        assert!(src.is_file());
    }

    #[test]
    fn staged_move_only_finishes_removing_the_source() {
        let td = tempdir().unwrap();
        // A complete copy already sits at the destination; the source lost some entries.
        let dest = td.path().join("moved");
        fs::create_dir_all(&dest).unwrap();
        for name in ["1", "2", "3"] {
            fs::write(dest.join(name), name).unwrap();
        }
        let src = td.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("3"), "3").unwrap();

        let mut staged = true;
        move_once(&src, &dest, &mut staged).unwrap();
        assert!(!src.exists());
        for name in ["1", "2", "3"] {
            assert_eq!(fs::read_to_string(dest.join(name)).unwrap(), name);
        }

        // Source already gone: the removal retry still succeeds.
        move_once(&src, &dest, &mut staged).unwrap();
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 3);
    }

    #[test]
    fn move_removes_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("dir");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/f"), b"f").unwrap();
        let dest = td.path().join("moved/dir");

        let res = perform(&SyncOperation::move_to(&src, &dest), fast());
        assert!(res.succeeded);
        assert!(!src.exists());
        assert_eq!(fs::read(dest.join("sub/f")).unwrap(), b"f");
    }

    #[test]
    fn delete_and_probe() {
        let td = tempdir().unwrap();
        let f = td.path().join("gone");
        fs::write(&f, b"x").unwrap();
        assert!(perform(&SyncOperation::delete(&f), fast()).succeeded);
        assert!(!f.exists());

        assert!(perform(&SyncOperation::write_probe(td.path()), fast()).succeeded);
        assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
    }

    #[test]
    fn probe_on_missing_dir_is_not_found() {
        let td = tempdir().unwrap();
        let res = perform(&SyncOperation::write_probe(td.path().join("missing")), fast());
        assert!(!res.succeeded);
        assert_eq!(res.last_error, Some(SyncErrorKind::NotFound));
    }
}
