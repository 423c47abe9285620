//! CLI definition and parsing.
//! Defines Args (global flags + one subcommand) and provides parse().
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags only override settings for this run; they are never persisted.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{LauncherConfig, LogLevel};

/// Keep a game installation patched and its controller config in place.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Resilient game file synchronization for the co-op launcher")]
pub struct Args {
    /// Settings file to use instead of launch_sync.xml next to the executable.
    #[arg(long, short = 'c', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Copy the shipped online patch into the installation.
    Patch,
    /// Copy the shipped update files into the installation.
    Update,
    /// Install Steam controller templates and the companion config file.
    ControllerFix,
    /// Replace the game's regulation file with a mod (name under mods/ or a path).
    ApplyMod {
        #[arg(value_name = "NAME|PATH")]
        name: String,
    },
    /// Restore the regulation file captured before the first mod.
    Reset,
    /// Set the co-op player count (1-3).
    Players {
        #[arg(value_name = "N")]
        count: u8,
    },
    /// Point the launcher at a game folder (the folder or its Game/ subfolder).
    SetInstall {
        #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
    /// Print the settings file location and exit.
    PrintConfig,
    /// Show the current settings and installation state.
    Status,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use settings).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut LauncherConfig) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }

    /// Directory given to `set-install`, with stray shell quoting removed.
    pub fn install_candidate(&self) -> Option<PathBuf> {
        match &self.command {
            Command::SetInstall { dir } => Some(sanitize_str(&dir.to_string_lossy())),
            _ => None,
        }
    }
}

/// Trim surrounding quotes (PowerShell/CMD leave them in) and one trailing separator.
fn sanitize_str(s: &str) -> PathBuf {
    let trimmed = s.trim();
    let mut inner = trimmed.trim_matches(|c| c == '\'' || c == '"').to_string();
    if (inner.ends_with('\\') || inner.ends_with('/')) && inner.len() > 1 && !inner.ends_with(":\\") {
        inner.pop();
    }
    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}
