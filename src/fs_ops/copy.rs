//! Copy primitives used by the retry loop.
//! - `replace_file`: copy into a hidden temp sibling, fsync, then rename into place,
//!   so a reader never observes a partially written destination file.
//! - `copy_dir_recursive`: rebuild a directory tree entry by entry with `replace_file`.
//! - `remove_existing`: clear a destination path (file or tree) before it is rewritten.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::helpers::io_error_with_help_io;
use super::{io_copy, metadata, util};

/// Copy `src` to `dest` via temp file + rename. Returns bytes copied.
pub(super) fn replace_file(src: &Path, dest: &Path) -> io::Result<u64> {
    let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let src_meta = fs::metadata(src).map_err(io_error_with_help_io("stat source", src))?;

    let tmp = util::unique_temp_path(dest_dir, "copy");
    let bytes = match io_copy::copy_streaming(src, &tmp) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(io_error_with_help_io("copy to temporary file", &tmp)(e));
        }
    };
    metadata::preserve_metadata(&tmp, &src_meta);

    if let Err(e) = rename_into_place(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    trace!(src = %src.display(), dest = %dest.display(), bytes, "file replaced");
    Ok(bytes)
}

/// Rename `tmp` onto `dest`; fsync the parent directory on Unix (best-effort).
fn rename_into_place(tmp: &Path, dest: &Path) -> io::Result<()> {
    fs::rename(tmp, dest).map_err(io_error_with_help_io("rename temporary file into place", dest))?;
    if let Some(parent) = dest.parent() {
        let _ = util::fsync_dir(parent);
    }
    Ok(())
}

/// Recursively copy directory `src` to `dest` (which must not exist yet).
/// Returns the number of files copied.
pub(super) fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<u64> {
    fs::create_dir_all(dest).map_err(io_error_with_help_io("create directory", dest))?;

    let mut files = 0u64;
    let mut dirs = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            let ioe = e.into_io_error().unwrap_or_else(|| io::Error::other("filesystem loop detected"));
            io_error_with_help_io("walk source tree", &path)(ioe)
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error_with_help_io("create directory", &target))?;
            dirs.push((entry.path().to_path_buf(), target));
        } else {
            replace_file(entry.path(), &target)?;
            files += 1;
        }
    }

    // Directory timestamps last; writing children bumps a directory's mtime.
    dirs.push((src.to_path_buf(), dest.to_path_buf()));
    for (from, to) in dirs.iter().rev() {
        if let Ok(meta) = fs::metadata(from) {
            let mtime = filetime::FileTime::from_last_modification_time(&meta);
            let _ = filetime::set_file_mtime(to, mtime);
        }
    }
    debug!(src = %src.display(), dest = %dest.display(), files, "directory copied");
    Ok(files)
}

/// Remove whatever currently sits at `path`. Missing paths are fine.
pub(super) fn remove_existing(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_error_with_help_io("stat destination", path)(e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(io_error_with_help_io("remove destination directory", path))
    } else {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            // Read-only files refuse deletion on Windows; clear the flag and try once more.
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied && meta.permissions().readonly() => {
                let mut perms = meta.permissions();
                perms.set_readonly(false);
                fs::set_permissions(path, perms)
                    .and_then(|_| fs::remove_file(path))
                    .map_err(io_error_with_help_io("remove read-only destination file", path))
            }
            Err(e) => Err(io_error_with_help_io("remove destination file", path)(e)),
        }
    }
}
