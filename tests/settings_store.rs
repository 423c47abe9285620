use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use launch_sync::config::SETTINGS_ENV;
use launch_sync::{ActionFlag, LogLevel, SettingKey, SettingsStore, default_settings_path};

#[test]
fn mark_action_done_survives_restart() {
    let td = tempdir().unwrap();
    let path = td.path().join("launch_sync.xml");
    {
        let mut store = SettingsStore::load(&path).unwrap();
        store.mark_action_done(ActionFlag::CompanionFileMoved).unwrap();
    }
    let store = SettingsStore::load(&path).unwrap();
    assert!(store.is_action_done(ActionFlag::CompanionFileMoved));
    assert_eq!(store.get(SettingKey::CompanionFileMoved), "true");
}

#[test]
fn set_is_on_disk_before_returning() {
    let td = tempdir().unwrap();
    let path = td.path().join("launch_sync.xml");
    let mut store = SettingsStore::load(&path).unwrap();
    store.set_and_persist(SettingKey::Theme, "Crimson").unwrap();
    store.set_and_persist(SettingKey::LogLevel, "debug").unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("<theme>Crimson</theme>"));

    let reread = SettingsStore::load(&path).unwrap();
    assert_eq!(reread.config().theme, "Crimson");
    assert_eq!(reread.config().log_level, LogLevel::Debug);
}

#[test]
fn missing_keys_are_filled_and_written_back() {
    let td = tempdir().unwrap();
    let path = td.path().join("launch_sync.xml");
    fs::write(
        &path,
        "<launcher>\n  <installation_dir>/games/nr/Game</installation_dir>\n  <first_launch>False</first_launch>\n</launcher>\n",
    )
    .unwrap();

    let store = SettingsStore::load(&path).unwrap();
    assert!(!store.config().first_launch);
    assert_eq!(store.get(SettingKey::InstallationDir), "/games/nr/Game");

    let text = fs::read_to_string(&path).unwrap();
    for key in ["steam_dir", "theme", "companion_file_moved", "player_count", "retry_attempts"] {
        assert!(text.contains(&format!("<{key}>")), "{key} missing:\n{text}");
    }
    assert!(text.contains("<first_launch>false</first_launch>"));
}

#[test]
fn unknown_element_is_an_error() {
    let td = tempdir().unwrap();
    let path = td.path().join("launch_sync.xml");
    fs::write(&path, "<launcher><download_base>/x</download_base></launcher>").unwrap();
    let err = SettingsStore::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("launch_sync.xml"));
}

#[test]
fn unknown_key_is_rejected_by_name() {
    assert!("colour".parse::<SettingKey>().is_err());
    assert_eq!("PLAYER_COUNT".parse::<SettingKey>().unwrap(), SettingKey::PlayerCount);
}

#[test]
#[serial]
fn env_override_selects_settings_file() {
    let td = tempdir().unwrap();
    let path = td.path().join("elsewhere.xml");
    unsafe {
        std::env::set_var(SETTINGS_ENV, &path);
    }
    let resolved = default_settings_path().unwrap();
    let store = SettingsStore::open_default();
    unsafe {
        std::env::remove_var(SETTINGS_ENV);
    }
    assert_eq!(resolved, path);
    assert_eq!(store.unwrap().path(), path.as_path());
    assert!(path.is_file());
}
