//! XML settings file.
//! - `parse_settings` reads `<launcher>`; absent keys take defaults and are reported.
//! - `render_settings` writes every key so the file is self-describing.
//!
//! Notes:
//! - Unknown elements are rejected (deny_unknown_fields) to surface typos early.
//! - Values are read as text and parsed by the typed schema, so `True`/`False`
//!   written by older tools are accepted.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{LauncherConfig, SettingKey};
use crate::platform::write_settings_atomic;

/// Struct mirroring the XML file for (de)serialization.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename = "launcher")]
#[serde(deny_unknown_fields)]
struct SettingsXml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installation_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    steam_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    companion_file_moved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    antivirus_warning_shown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_launch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_attempts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_backoff_ms: Option<String>,
}

impl SettingsXml {
    fn slot(&mut self, key: SettingKey) -> &mut Option<String> {
        match key {
            SettingKey::InstallationDir => &mut self.installation_dir,
            SettingKey::SteamDir => &mut self.steam_dir,
            SettingKey::ResourceDir => &mut self.resource_dir,
            SettingKey::Theme => &mut self.theme,
            SettingKey::CompanionFileMoved => &mut self.companion_file_moved,
            SettingKey::AntivirusWarningShown => &mut self.antivirus_warning_shown,
            SettingKey::FirstLaunch => &mut self.first_launch,
            SettingKey::PlayerCount => &mut self.player_count,
            SettingKey::LogLevel => &mut self.log_level,
            SettingKey::LogFile => &mut self.log_file,
            SettingKey::RetryAttempts => &mut self.retry_attempts,
            SettingKey::RetryBackoffMs => &mut self.retry_backoff_ms,
        }
    }
}

/// Parsed file plus the keys that had to be filled from defaults.
#[derive(Debug)]
pub struct ParsedSettings {
    pub config: LauncherConfig,
    pub filled: Vec<SettingKey>,
}

/// Parse XML text. Missing keys and keys holding unusable values fall back to
/// defaults and are listed in `filled`.
pub fn parse_settings(text: &str) -> Result<ParsedSettings> {
    let mut parsed: SettingsXml = from_xml_str(text).context("invalid settings XML")?;
    let mut config = LauncherConfig::default();
    let mut filled = Vec::new();

    for key in SettingKey::ALL {
        match parsed.slot(key).take() {
            Some(v) if key == SettingKey::LogFile || !v.trim().is_empty() => {
                if let Err(e) = config.set(key, &v) {
                    warn!(key = %key, error = %e, "ignoring invalid setting; using default");
                    filled.push(key);
                }
            }
            // An absent log_file already means "no log file".
            _ if key == SettingKey::LogFile => {}
            _ => filled.push(key),
        }
    }
    Ok(ParsedSettings { config, filled })
}

/// Render every key of `config` as XML.
pub fn render_settings(config: &LauncherConfig) -> Result<String> {
    let mut doc = SettingsXml::default();
    for key in SettingKey::ALL {
        *doc.slot(key) = Some(config.get(key));
    }
    let mut body = String::new();
    let mut ser = quick_xml::se::Serializer::new(&mut body);
    ser.indent(' ', 2);
    doc.serialize(ser).context("serialize settings")?;

    let mut out = String::with_capacity(body.len() + 128);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!-- launch_sync settings; rewritten on every change -->\n");
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

/// Read and parse a settings file.
pub fn read_settings_file(path: &Path) -> Result<ParsedSettings> {
    let text = fs::read_to_string(path).with_context(|| format!("read settings file {}", path.display()))?;
    parse_settings(&text).with_context(|| format!("parse settings file {}", path.display()))
}

/// Atomically replace the settings file with `config`.
pub fn write_settings_file(path: &Path, config: &LauncherConfig) -> Result<()> {
    let xml = render_settings(config)?;
    write_settings_atomic(path, xml.as_bytes())?;
    debug!(path = %path.display(), "settings written");
    Ok(())
}
