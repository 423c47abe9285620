//! Caller-level actions.
//! Each action takes the loaded settings explicitly, reports through a `ProgressSink`
//! (`Started`, any `Progress`, one terminal event) and returns typed failures inside
//! `anyhow::Error` so callers can downcast to `LaunchSyncError`.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{ActionFlag, LauncherConfig, SettingKey, SettingsStore};
use crate::errors::LaunchSyncError;
use crate::events::ProgressSink;
use crate::fs_ops::{SyncOperation, io_error_with_help, perform};
use crate::ini;
use crate::mods::{ApplyOutcome, ModApplier};
use crate::resolve::require_installation;
use crate::sync::{TreeSyncResult, sync_tree};

/// Bracket `body` with `Started` and a terminal event.
fn run_action<S, T, F>(sink: &mut S, title: &str, done: &str, body: F) -> Result<T>
where
    S: ProgressSink,
    F: FnOnce(&mut S) -> Result<T>,
{
    sink.started(title);
    match body(&mut *sink) {
        Ok(v) => {
            sink.succeeded(done);
            Ok(v)
        }
        Err(e) => {
            sink.failed(format!("{e:#}"));
            Err(e)
        }
    }
}

/// Validate the installation and the shipped tree, probe for write access, then sync.
fn install_tree<S: ProgressSink>(cfg: &LauncherConfig, source: &Path, sink: &mut S) -> Result<TreeSyncResult> {
    let install = require_installation(&cfg.installation_dir)?;
    if !source.is_dir() {
        return Err(LaunchSyncError::SourceMissing(source.to_path_buf()).into());
    }
    let probe = SyncOperation::write_probe(&install);
    perform(&probe, cfg.retry_policy()).into_result(&probe)?;
    debug!(install = %install.display(), "installation writable");

    let res = sync_tree(source, &install, cfg.retry_policy(), sink).into_result()?;
    Ok(res)
}

/// Copy the shipped online patch over the installation.
pub fn patch_game<S: ProgressSink>(cfg: &LauncherConfig, sink: &mut S) -> Result<TreeSyncResult> {
    run_action(sink, "Patching game files...", "Game patched successfully", |sink| {
        install_tree(cfg, &cfg.patch_dir(), sink)
    })
}

/// Copy the shipped update tree over the installation.
pub fn update_game<S: ProgressSink>(cfg: &LauncherConfig, sink: &mut S) -> Result<TreeSyncResult> {
    run_action(sink, "Updating game files...", "Game updated successfully", |sink| {
        install_tree(cfg, &cfg.update_dir(), sink)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerFix {
    pub templates: TreeSyncResult,
    /// The companion file was placed by this run.
    pub companion_placed: bool,
}

/// Install the controller templates and, once per installation, the companion file.
pub fn fix_controller<S: ProgressSink>(store: &mut SettingsStore, sink: &mut S) -> Result<ControllerFix> {
    run_action(sink, "Applying controller fix...", "Controller fix applied successfully", |sink| {
        let cfg = store.config().clone();
        let templates_src = cfg.templates_dir();
        if !templates_src.is_dir() {
            return Err(LaunchSyncError::SourceMissing(templates_src).into());
        }
        let templates_dest = cfg.steam_templates_dir();
        let config_dir = cfg.steam_controller_config_dir();
        for dir in [&templates_dest, &config_dir] {
            fs::create_dir_all(dir).map_err(io_error_with_help("create Steam directory", dir))?;
        }

        let templates = sync_tree(&templates_src, &templates_dest, cfg.retry_policy(), sink).into_result()?;

        let mut companion_placed = false;
        if store.is_action_done(ActionFlag::CompanionFileMoved) {
            sink.progress("Companion file already in place");
        } else {
            let companion = cfg.companion_file();
            if !companion.is_file() {
                return Err(LaunchSyncError::SourceMissing(companion).into());
            }
            let name = companion.file_name().map(PathBuf::from).unwrap_or_default();
            let op = SyncOperation::copy(&companion, config_dir.join(&name));
            perform(&op, cfg.retry_policy()).into_result(&op)?;
            store.mark_action_done(ActionFlag::CompanionFileMoved)?;
            sink.progress(format!("Placed {}", name.display()));
            companion_placed = true;
        }
        Ok(ControllerFix { templates, companion_placed })
    })
}

/// Payload for `name`: an explicit path, `mods/<name>` as a file, or `mods/<name>/<payload>`.
pub fn resolve_payload(cfg: &LauncherConfig, applier: &ModApplier, name: &str) -> PathBuf {
    let given = Path::new(name);
    if given.is_absolute() || given.components().count() > 1 {
        return given.to_path_buf();
    }
    let candidate = cfg.mods_dir().join(given);
    if candidate.is_dir() {
        candidate.join(applier.payload_name())
    } else {
        candidate
    }
}

/// Swap the installation's payload for the named mod.
pub fn apply_mod<S: ProgressSink>(cfg: &LauncherConfig, name: &str, sink: &mut S) -> Result<ApplyOutcome> {
    run_action(sink, &format!("Applying mod {name}..."), "Mod applied successfully", |sink| {
        let install = require_installation(&cfg.installation_dir)?;
        let applier = ModApplier::new(cfg.retry_policy());
        let payload = resolve_payload(cfg, &applier, name);
        let outcome = applier.apply_payload(&payload, &install)?;
        if outcome.backup_created {
            sink.progress("Original payload backed up");
        }
        Ok(outcome)
    })
}

/// Restore the payload captured before the first mod was applied.
pub fn reset_to_normal<S: ProgressSink>(cfg: &LauncherConfig, sink: &mut S) -> Result<u32> {
    run_action(sink, "Restoring original files...", "Game reset to normal", |_| {
        let install = require_installation(&cfg.installation_dir)?;
        let attempts = ModApplier::new(cfg.retry_policy()).reset_to_original(&install)?;
        Ok(attempts)
    })
}

/// Write the co-op player count into the installation and remember it.
pub fn set_player_count<S: ProgressSink>(store: &mut SettingsStore, count: u8, sink: &mut S) -> Result<()> {
    run_action(sink, &format!("Setting player count to {count}..."), &format!("Player count set to {count}"), |_| {
        let cfg = store.config();
        let install = require_installation(&cfg.installation_dir)?;
        ini::set_player_count(&ini::coop_settings_path(&install), count, cfg.retry_policy())?;
        store.set_and_persist(SettingKey::PlayerCount, &count.to_string())?;
        Ok(())
    })
}

/// Accept a folder chosen by the operator when it (or a known subfolder) is the installation.
/// Settings stay untouched on rejection.
pub fn set_installation<S: ProgressSink>(store: &mut SettingsStore, candidate: &Path, sink: &mut S) -> Result<PathBuf> {
    run_action(sink, "Checking game folder...", "Game folder saved", |_| {
        let install = require_installation(candidate)?;
        let resolved = install.clone();
        store.update(move |cfg| {
            cfg.installation_dir = resolved;
            Ok(())
        })?;
        info!(install = %install.display(), "installation directory saved");
        Ok(install)
    })
}
