//! Guarded settings store.
//! Every mutation is flushed to disk before it returns; when the write fails the
//! previous in-memory value is restored, so memory and disk never disagree.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::legacy;
use super::paths::{default_settings_path, legacy_settings_path};
use super::types::{ActionFlag, LauncherConfig, SettingKey};
use super::xml::{read_settings_file, write_settings_file};

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    config: LauncherConfig,
}

impl SettingsStore {
    /// Load settings from `path`.
    /// - missing file: legacy import if present, else defaults; written immediately
    /// - missing keys: filled with defaults and the merged file written back
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (config, write_back) = if path.exists() {
            let parsed = read_settings_file(&path)?;
            if !parsed.filled.is_empty() {
                debug!(path = %path.display(), filled = ?parsed.filled, "filling missing settings");
            }
            let dirty = !parsed.filled.is_empty();
            (parsed.config, dirty)
        } else {
            let legacy_path = legacy_settings_path(&path);
            let config = if legacy_path.is_file() {
                legacy::import_file(&legacy_path)?
            } else {
                info!(path = %path.display(), "creating settings file with defaults");
                LauncherConfig::default()
            };
            (config, true)
        };
        if write_back {
            write_settings_file(&path, &config)?;
        }
        Ok(Self { path, config })
    }

    /// Load from the default location (`LAUNCH_SYNC_CONFIG` or next to the executable).
    pub fn open_default() -> Result<Self> {
        Self::load(default_settings_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot passed into actions.
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn get(&self, key: SettingKey) -> String {
        self.config.get(key)
    }

    /// Parse, assign and persist one setting.
    pub fn set_and_persist(&mut self, key: SettingKey, value: &str) -> Result<()> {
        self.update(|cfg| cfg.set(key, value).map_err(anyhow::Error::from))?;
        info!(key = %key, value = %self.config.get(key), "setting saved");
        Ok(())
    }

    /// Apply a typed mutation and persist it. Nothing changes if either step fails.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut LauncherConfig) -> Result<()>,
    {
        let mut next = self.config.clone();
        f(&mut next)?;
        if next == self.config {
            return Ok(());
        }
        write_settings_file(&self.path, &next)?;
        self.config = next;
        Ok(())
    }

    pub fn is_action_done(&self, flag: ActionFlag) -> bool {
        self.config.flag(flag)
    }

    /// Record a one-time action. Call only after the action itself succeeded.
    pub fn mark_action_done(&mut self, flag: ActionFlag) -> Result<()> {
        self.set_and_persist(flag.key(), "true")
    }
}
