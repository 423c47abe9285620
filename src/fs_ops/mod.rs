//! Filesystem operations: modularized.

mod copy;
mod helpers;
mod io_copy;
mod metadata;
mod op;
mod retry;
mod util;

pub use helpers::{classify, io_error_with_help, io_error_with_help_io};
pub use op::{
    AttemptError, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, EntryKind, FileEntry, RetryPolicy,
    SyncOperation, SyncResult,
};
pub use retry::{perform, retry_with_backoff};
pub(crate) use util::unique_temp_path;
