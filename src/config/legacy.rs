//! Import of the older `key=value` settings file.
//! One pair per line; `#` and `;` start comments; booleans are `True`/`False`.
//! Unknown keys and unusable values are logged and skipped.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::types::{LauncherConfig, SettingKey};

/// Split legacy text into trimmed `(key, value)` pairs.
pub fn parse_pairs(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with(';') && !l.starts_with('['))
        .filter_map(|l| {
            let (k, v) = l.split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

/// Apply legacy pairs over defaults. Returns the config and the keys that were imported.
pub fn import_text(text: &str) -> (LauncherConfig, Vec<SettingKey>) {
    let mut config = LauncherConfig::default();
    let mut imported = Vec::new();
    for (k, v) in parse_pairs(text) {
        let key = match k.parse::<SettingKey>() {
            Ok(key) => key,
            Err(_) => {
                warn!(key = %k, "unknown legacy setting ignored");
                continue;
            }
        };
        match config.set(key, &v) {
            Ok(()) => imported.push(key),
            Err(e) => warn!(key = %key, error = %e, "invalid legacy setting ignored"),
        }
    }
    (config, imported)
}

/// Read and import a legacy file.
pub fn import_file(path: &Path) -> Result<LauncherConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("read legacy settings {}", path.display()))?;
    let (config, imported) = import_text(&text);
    info!(path = %path.display(), imported = imported.len(), "imported legacy settings");
    Ok(config)
}
