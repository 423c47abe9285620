//! Core configuration types.
//! - LauncherConfig is the typed settings schema, passed explicitly into every action.
//! - SettingKey/ActionFlag address individual settings by their persisted names.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::LaunchSyncError;
use crate::fs_ops::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

use super::paths;
use super::{DEFAULT_PLAYER_COUNT, DEFAULT_THEME, MAX_PLAYER_COUNT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Persisted setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    InstallationDir,
    SteamDir,
    ResourceDir,
    Theme,
    CompanionFileMoved,
    AntivirusWarningShown,
    FirstLaunch,
    PlayerCount,
    LogLevel,
    LogFile,
    RetryAttempts,
    RetryBackoffMs,
}

impl SettingKey {
    pub const ALL: [SettingKey; 12] = [
        SettingKey::InstallationDir,
        SettingKey::SteamDir,
        SettingKey::ResourceDir,
        SettingKey::Theme,
        SettingKey::CompanionFileMoved,
        SettingKey::AntivirusWarningShown,
        SettingKey::FirstLaunch,
        SettingKey::PlayerCount,
        SettingKey::LogLevel,
        SettingKey::LogFile,
        SettingKey::RetryAttempts,
        SettingKey::RetryBackoffMs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::InstallationDir => "installation_dir",
            SettingKey::SteamDir => "steam_dir",
            SettingKey::ResourceDir => "resource_dir",
            SettingKey::Theme => "theme",
            SettingKey::CompanionFileMoved => "companion_file_moved",
            SettingKey::AntivirusWarningShown => "antivirus_warning_shown",
            SettingKey::FirstLaunch => "first_launch",
            SettingKey::PlayerCount => "player_count",
            SettingKey::LogLevel => "log_level",
            SettingKey::LogFile => "log_file",
            SettingKey::RetryAttempts => "retry_attempts",
            SettingKey::RetryBackoffMs => "retry_backoff_ms",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = LaunchSyncError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LaunchSyncError::InvalidSetting(format!("unknown setting key '{wanted}'")))
    }
}

/// One-time actions whose completion survives restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFlag {
    /// The controller companion file has been placed into Steam's config directory.
    CompanionFileMoved,
    AntivirusWarningShown,
}

impl ActionFlag {
    pub fn key(&self) -> SettingKey {
        match self {
            ActionFlag::CompanionFileMoved => SettingKey::CompanionFileMoved,
            ActionFlag::AntivirusWarningShown => SettingKey::AntivirusWarningShown,
        }
    }
}

/// Parse the boolean spellings found in settings files (`True`, `false`, `1`, `no`, ...).
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: SettingKey, value: &str, expected: &str) -> LaunchSyncError {
    LaunchSyncError::InvalidSetting(format!("{key}: '{value}' is not {expected}"))
}

/// Launcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Root of the game installation (holds the launcher executable).
    pub installation_dir: PathBuf,
    /// Steam root (holds controller_base/ and controller_config/).
    pub steam_dir: PathBuf,
    /// Shipped read-only resources (patch/update/templates trees, companion file, mods).
    pub resource_dir: PathBuf,
    pub theme: String,
    pub companion_file_moved: bool,
    pub antivirus_warning_shown: bool,
    pub first_launch: bool,
    /// Co-op player count, 1..=3
    pub player_count: u8,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            installation_dir: paths::default_installation_dir(),
            steam_dir: paths::default_steam_dir(),
            resource_dir: paths::default_resource_dir(),
            theme: DEFAULT_THEME.to_string(),
            companion_file_moved: false,
            antivirus_warning_shown: false,
            first_launch: true,
            player_count: DEFAULT_PLAYER_COUNT,
            log_level: LogLevel::Normal,
            log_file: None,
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_BACKOFF.as_millis() as u64,
        }
    }
}

impl LauncherConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn flag(&self, flag: ActionFlag) -> bool {
        match flag {
            ActionFlag::CompanionFileMoved => self.companion_file_moved,
            ActionFlag::AntivirusWarningShown => self.antivirus_warning_shown,
        }
    }

    /// Persisted string form of a setting.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::InstallationDir => self.installation_dir.display().to_string(),
            SettingKey::SteamDir => self.steam_dir.display().to_string(),
            SettingKey::ResourceDir => self.resource_dir.display().to_string(),
            SettingKey::Theme => self.theme.clone(),
            SettingKey::CompanionFileMoved => self.companion_file_moved.to_string(),
            SettingKey::AntivirusWarningShown => self.antivirus_warning_shown.to_string(),
            SettingKey::FirstLaunch => self.first_launch.to_string(),
            SettingKey::PlayerCount => self.player_count.to_string(),
            SettingKey::LogLevel => self.log_level.to_string(),
            SettingKey::LogFile => self
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            SettingKey::RetryAttempts => self.retry_attempts.to_string(),
            SettingKey::RetryBackoffMs => self.retry_backoff_ms.to_string(),
        }
    }

    /// Parse and assign one setting. The config is unchanged on error.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), LaunchSyncError> {
        let v = value.trim();
        let as_bool = || parse_bool(v).ok_or_else(|| invalid(key, v, "a boolean"));
        let as_path = || {
            if v.is_empty() {
                Err(invalid(key, v, "a path"))
            } else {
                Ok(PathBuf::from(v))
            }
        };
        match key {
            SettingKey::InstallationDir => self.installation_dir = as_path()?,
            SettingKey::SteamDir => self.steam_dir = as_path()?,
            SettingKey::ResourceDir => self.resource_dir = as_path()?,
            SettingKey::Theme => {
                if v.is_empty() {
                    return Err(invalid(key, v, "a theme name"));
                }
                self.theme = v.to_string();
            }
            SettingKey::CompanionFileMoved => self.companion_file_moved = as_bool()?,
            SettingKey::AntivirusWarningShown => self.antivirus_warning_shown = as_bool()?,
            SettingKey::FirstLaunch => self.first_launch = as_bool()?,
            SettingKey::PlayerCount => {
                let n: u8 = v.parse().map_err(|_| invalid(key, v, "a number"))?;
                if !(1..=MAX_PLAYER_COUNT).contains(&n) {
                    return Err(invalid(key, v, "between 1 and 3"));
                }
                self.player_count = n;
            }
            SettingKey::LogLevel => {
                self.log_level = LogLevel::parse(v).ok_or_else(|| invalid(key, v, "a log level"))?;
            }
            SettingKey::LogFile => {
                self.log_file = if v.is_empty() { None } else { Some(PathBuf::from(v)) };
            }
            SettingKey::RetryAttempts => {
                let n: u32 = v.parse().map_err(|_| invalid(key, v, "a number"))?;
                if n == 0 {
                    return Err(invalid(key, v, "at least 1"));
                }
                self.retry_attempts = n;
            }
            SettingKey::RetryBackoffMs => {
                self.retry_backoff_ms = v.parse().map_err(|_| invalid(key, v, "a number"))?;
            }
        }
        Ok(())
    }

    // Derived locations of shipped resources and install targets.

    pub fn patch_dir(&self) -> PathBuf {
        self.resource_dir.join("online_patch")
    }

    pub fn update_dir(&self) -> PathBuf {
        self.resource_dir.join("update")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resource_dir.join("templates")
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.resource_dir.join("mods")
    }

    pub fn companion_file(&self) -> PathBuf {
        self.resource_dir.join(super::COMPANION_FILE_NAME)
    }

    pub fn steam_templates_dir(&self) -> PathBuf {
        self.steam_dir.join("controller_base").join("templates")
    }

    pub fn steam_controller_config_dir(&self) -> PathBuf {
        self.steam_dir.join("controller_config")
    }
}
