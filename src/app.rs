//! Application orchestrator.
//! Loads settings, initializes logging, and dispatches the chosen command.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, error};

use launch_sync::cli::{Args, Command};
use launch_sync::config::{ActionFlag, SETTINGS_ENV, SettingKey, SettingsStore, default_settings_path};
use launch_sync::events::{LogSink, ProgressSink};
use launch_sync::mods::ModApplier;
use launch_sync::output::{self as out, ConsoleSink};
use launch_sync::resolve::{KNOWN_SUBDIRS, MARKER_FILE, resolve_installation};
use launch_sync::{LaunchSyncError, actions};

use crate::logging::init_tracing;

fn settings_path(args: &Args) -> Result<PathBuf> {
    match &args.config {
        Some(p) => Ok(p.clone()),
        None => default_settings_path(),
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle print-config before touching the file or logging.
    if args.command == Command::PrintConfig {
        if let Ok(env) = std::env::var(SETTINGS_ENV)
            && args.config.is_none()
        {
            out::print_info(&format!("Using {SETTINGS_ENV} (explicit):\n  {env}\n"));
        }
        match settings_path(&args) {
            Ok(p) => {
                out::print_user(&p.display().to_string());
                if p.exists() {
                    out::print_info("A settings file already exists at that location.");
                } else {
                    out::print_info("No settings file exists there yet; any other command creates it with defaults.");
                }
            }
            Err(e) => out::print_error(&format!("Could not determine the settings path: {e:#}")),
        }
        return Ok(());
    }

    let path = settings_path(&args)?;
    let mut store = SettingsStore::load(&path).inspect_err(|e| {
        out::print_error(&format!("Failed to load settings from {}: {e:#}", path.display()));
    })?;

    let mut run_cfg = store.config().clone();
    args.apply_overrides(&mut run_cfg);
    let guard = init_tracing(run_cfg.log_level, run_cfg.log_file.as_deref(), args.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;
    debug!(settings = %store.path().display(), command = ?args.command, "starting launch_sync");

    let result = if args.json {
        dispatch(&args, &mut store, &mut LogSink)
    } else {
        dispatch(&args, &mut store, &mut ConsoleSink)
    };

    if let Err(e) = &result {
        match e.downcast_ref::<LaunchSyncError>() {
            Some(ls) => {
                let kind = ls.kind().map(|k| k.as_str()).unwrap_or("precondition");
                error!(code = ls.code(), kind, error = %ls, "command failed");
                if let LaunchSyncError::BackupMissing { .. } = ls {
                    out::print_info("Run `launch_sync update` or `launch_sync patch` first to create a base state.");
                }
                if let LaunchSyncError::NotAnInstallation { .. } = ls {
                    out::print_info("Use `launch_sync set-install <DIR>` to choose the game folder.");
                }
            }
            None => error!(error = ?e, "command failed"),
        }
    }

    // Flush file logs before exit.
    drop(guard);
    result
}

fn dispatch<S: ProgressSink>(args: &Args, store: &mut SettingsStore, sink: &mut S) -> Result<()> {
    let cfg = store.config().clone();
    match &args.command {
        Command::Patch => {
            actions::patch_game(&cfg, sink)?;
        }
        Command::Update => {
            actions::update_game(&cfg, sink)?;
        }
        Command::ControllerFix => {
            actions::fix_controller(store, sink)?;
        }
        Command::ApplyMod { name } => {
            actions::apply_mod(&cfg, name, sink)?;
        }
        Command::Reset => {
            actions::reset_to_normal(&cfg, sink)?;
        }
        Command::Players { count } => actions::set_player_count(store, *count, sink)?,
        Command::SetInstall { .. } => {
            let dir = args.install_candidate().unwrap_or_default();
            actions::set_installation(store, &dir, sink)?;
        }
        Command::Status => print_status(store),
        Command::PrintConfig => {}
    }
    Ok(())
}

fn print_status(store: &SettingsStore) {
    let cfg = store.config();
    out::print_user(&format!("settings:        {}", store.path().display()));
    for key in SettingKey::ALL {
        out::print_user(&format!("{:<24} {}", key.as_str(), cfg.get(key)));
    }
    match resolve_installation(&cfg.installation_dir, MARKER_FILE, KNOWN_SUBDIRS) {
        Some(install) => {
            out::print_user(&format!("installation:    {}", install.display()));
            let applier = ModApplier::new(cfg.retry_policy());
            let backup = if applier.has_backup(&install) { "present" } else { "none" };
            out::print_user(&format!("original backup: {backup}"));
        }
        None => out::print_warn(&format!(
            "{} does not contain {MARKER_FILE}; use `launch_sync set-install <DIR>`",
            cfg.installation_dir.display()
        )),
    }
    let companion = if store.is_action_done(ActionFlag::CompanionFileMoved) { "yes" } else { "no" };
    out::print_user(&format!("companion placed: {companion}"));
}
