//! Core library for `launch_sync`.
//!
//! Resilient file-tree synchronization for a game launcher: retrying copies with
//! verification, fail-fast tree sync, marker-file installation discovery, a guarded
//! settings store for one-time actions, and payload swaps with a one-time backup.
//!
//! Public API is re-exported here so callers can use `launch_sync::...` directly.

pub mod actions;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod fs_ops;
pub mod ini;
pub mod mods;
pub mod output;
pub mod platform;
pub mod resolve;
pub mod sync;

pub use config::{
    ActionFlag, LauncherConfig, LogLevel, SettingKey, SettingsStore, default_log_path,
    default_settings_path, path_has_symlink_ancestor,
};
pub use errors::{LaunchSyncError, SyncErrorKind};
pub use events::{Phase, ProgressEvent, ProgressSink, Recorder};
pub use fs_ops::{EntryKind, FileEntry, RetryPolicy, SyncOperation, SyncResult, perform, retry_with_backoff};
pub use mods::ModApplier;
pub use resolve::{require_installation, resolve_installation};
pub use sync::{TreeSyncResult, list_tree, sync_tree};
