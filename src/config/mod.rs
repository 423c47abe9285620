//! Launcher settings.
//! Typed schema, default locations, the XML file format, legacy import, and the
//! guarded store that persists every change before reporting success.

pub mod legacy;
pub mod paths;
pub mod store;
pub mod types;
pub mod xml;

pub use paths::{default_log_path, default_settings_path, legacy_settings_path, path_has_symlink_ancestor};
pub use store::SettingsStore;
pub use types::{ActionFlag, LauncherConfig, LogLevel, SettingKey};

/// Settings file name, placed next to the executable unless overridden.
pub const SETTINGS_FILE_NAME: &str = "launch_sync.xml";
/// Environment override for the settings file location.
pub const SETTINGS_ENV: &str = "LAUNCH_SYNC_CONFIG";
/// Older key=value settings file, imported once when no XML file exists.
pub const LEGACY_FILE_NAME: &str = "launch_sync.cfg";

pub const DEFAULT_THEME: &str = "Teal";
pub const DEFAULT_PLAYER_COUNT: u8 = 3;
pub const MAX_PLAYER_COUNT: u8 = 3;
/// Controller companion file shipped in the resource directory.
pub const COMPANION_FILE_NAME: &str = "game_actions_480.vdf";
