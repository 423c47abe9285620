//! I/O error helpers.
//!
//! - `classify` maps an io::Error onto the retry loop's `SyncErrorKind`, looking
//!   through the context wrapper so the raw OS code still decides.
//! - `io_error_with_help*` enrich an io::Error with the operation, the path and an
//!   operator hint so the final logged failure is actionable.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help_io("create dir", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

use crate::errors::SyncErrorKind;

/// Raw OS code first, then ErrorKind.
fn classify_raw(e: &io::Error) -> SyncErrorKind {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM | libc::EBUSY | libc::ETXTBSY | libc::EROFS => {
                    return SyncErrorKind::PermissionDenied;
                }
                libc::ENOENT => return SyncErrorKind::NotFound,
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 | 32 | 33 => return SyncErrorKind::PermissionDenied, // ACCESS_DENIED, SHARING_VIOLATION, LOCK_VIOLATION
                2 | 3 => return SyncErrorKind::NotFound,
                _ => {}
            }
        }
        #[cfg(not(any(unix, windows)))]
        let _ = code;
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => SyncErrorKind::PermissionDenied,
        io::ErrorKind::NotFound => SyncErrorKind::NotFound,
        _ => SyncErrorKind::Io,
    }
}

fn hint_for(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let hint = match code {
                libc::EACCES | libc::EPERM => {
                    Some("permission denied; close the game/Steam or run with sufficient rights.")
                }
                libc::EBUSY | libc::ETXTBSY => {
                    Some("resource busy; another process (antivirus, Steam, the game) holds the file.")
                }
                libc::ENOENT => Some("path not found; verify it exists."),
                libc::ENOSPC => Some("insufficient space on device."),
                libc::EROFS => Some("read-only filesystem; cannot write here."),
                libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments."),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
        #[cfg(windows)]
        {
            let hint = match code {
                5 => Some("access denied; run as administrator or check permissions."),
                32 | 33 => Some("sharing violation; file is in use by another process (antivirus, Steam, the game)."),
                2 | 3 => Some("path not found; verify it exists."),
                112 => Some("insufficient disk space."),
                206 => Some("filename or path too long (MAX_PATH exceeded)."),
                _ => None,
            };
            if hint.is_some() {
                return hint;
            }
        }
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; close the game/Steam or run with sufficient rights.")
        }
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists; remove the target first."),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(h) = hint_for(e) {
        msg.push_str(" - ");
        msg.push_str(h);
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {}]", code));
    }
    msg
}

/// Adapter for anyhow::Result code.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Adapter for io::Result code. Preserves the original ErrorKind (and therefore
/// the classification) while enriching the message.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| {
        let msg = build_message(op, path, &e);
        match e.raw_os_error() {
            // Keep the raw code reachable for classify() through the inner error.
            Some(_) => io::Error::new(e.kind(), OsCoded { code: e.raw_os_error(), msg }),
            None => io::Error::new(e.kind(), msg),
        }
    }
}

/// Message wrapper that remembers the raw os code of the original error.
#[derive(Debug)]
struct OsCoded {
    code: Option<i32>,
    msg: String,
}

impl std::fmt::Display for OsCoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for OsCoded {}

/// Map an io::Error (possibly wrapped by `io_error_with_help_io`) to the sync taxonomy.
/// Sharing violations and busy resources count as locks (PermissionDenied).
pub fn classify(e: &io::Error) -> SyncErrorKind {
    if let Some(inner) = e.get_ref().and_then(|i| i.downcast_ref::<OsCoded>()) {
        if let Some(code) = inner.code {
            return classify_raw(&io::Error::from_raw_os_error(code));
        }
    }
    classify_raw(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_taxonomy() {
        assert_eq!(
            classify(&io::Error::from(io::ErrorKind::PermissionDenied)),
            SyncErrorKind::PermissionDenied
        );
        assert_eq!(classify(&io::Error::from(io::ErrorKind::NotFound)), SyncErrorKind::NotFound);
        assert_eq!(classify(&io::Error::other("boom")), SyncErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn busy_counts_as_lock() {
        let e = io::Error::from_raw_os_error(libc::EBUSY);
        assert_eq!(classify(&e), SyncErrorKind::PermissionDenied);
    }

    #[cfg(unix)]
    #[test]
    fn wrapped_error_keeps_classification_and_context() {
        let p = Path::new("/game/regulation.bin");
        let wrapped = io_error_with_help_io("copy file", p)(io::Error::from_raw_os_error(libc::EBUSY));
        assert_eq!(classify(&wrapped), SyncErrorKind::PermissionDenied);
        let msg = wrapped.to_string();
        assert!(msg.contains("copy file"));
        assert!(msg.contains("regulation.bin"));
        assert!(msg.contains("os code"));
    }
}
