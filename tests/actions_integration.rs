use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::fs;
use std::path::Path;

use launch_sync::actions;
use launch_sync::config::COMPANION_FILE_NAME;
use launch_sync::events::{Phase, Recorder};
use launch_sync::mods::PAYLOAD_FILE;
use launch_sync::resolve::MARKER_FILE;
use launch_sync::{ActionFlag, LaunchSyncError, SettingKey, SettingsStore};

/// Layout: <tmp>/install/Game (the game), <tmp>/steam, <tmp>/res (shipped files).
fn setup(temp: &TempDir) -> SettingsStore {
    temp.child(format!("install/Game/{MARKER_FILE}")).touch().unwrap();
    temp.child(format!("install/Game/{PAYLOAD_FILE}")).write_str("factory").unwrap();
    temp.child("install/Game/SeamlessCoop/nrsc_settings.ini")
        .write_str("[GAMEPLAY]\n    player_count = 3\n")
        .unwrap();
    temp.child("steam").create_dir_all().unwrap();
    temp.child("res/online_patch/dinput8.dll").write_str("patched").unwrap();
    temp.child("res/online_patch/SeamlessCoop/nrsc.dll").write_str("coop").unwrap();
    temp.child("res/update/version.txt").write_str("2").unwrap();
    temp.child("res/templates/controller_neptune.vdf").write_str("tpl").unwrap();
    temp.child(format!("res/{COMPANION_FILE_NAME}")).write_str("actions").unwrap();
    temp.child("res/mods/hard/regulation.bin").write_str("hard").unwrap();

    let mut store = SettingsStore::load(temp.path().join("launch_sync.xml")).unwrap();
    let set = |store: &mut SettingsStore, key, value: &Path| {
        store.set_and_persist(key, &value.display().to_string()).unwrap()
    };
    set(&mut store, SettingKey::InstallationDir, &temp.path().join("install"));
    set(&mut store, SettingKey::SteamDir, &temp.path().join("steam"));
    set(&mut store, SettingKey::ResourceDir, &temp.path().join("res"));
    store.set_and_persist(SettingKey::RetryBackoffMs, "0").unwrap();
    store.set_and_persist(SettingKey::RetryAttempts, "2").unwrap();
    store
}

#[test]
fn patch_resolves_subdir_and_syncs() {
    let temp = TempDir::new().unwrap();
    let store = setup(&temp);
    let mut rec = Recorder::new();

    let res = actions::patch_game(store.config(), &mut rec).unwrap();
    assert_eq!(res.synced.len(), 2);
    temp.child("install/Game/dinput8.dll").assert("patched");
    temp.child("install/Game/SeamlessCoop/nrsc.dll").assert("coop");
    // the SeamlessCoop dir was replaced wholesale
    assert!(!temp.child("install/Game/SeamlessCoop/nrsc_settings.ini").path().exists());

    let phases = rec.phases();
    assert_eq!(phases.first(), Some(&Phase::Started));
    assert_eq!(phases.last(), Some(&Phase::Succeeded));
    assert_eq!(phases.iter().filter(|p| p.is_terminal()).count(), 1);
}

#[test]
fn update_without_shipped_tree_is_source_missing() {
    let temp = TempDir::new().unwrap();
    let store = setup(&temp);
    fs::remove_dir_all(temp.child("res/update").path()).unwrap();
    let mut rec = Recorder::new();
    let err = actions::update_game(store.config(), &mut rec).unwrap_err();
    assert!(matches!(err.downcast_ref::<LaunchSyncError>(), Some(LaunchSyncError::SourceMissing(_))));
    assert_eq!(rec.last().unwrap().phase, Phase::Failed);
}

#[test]
fn controller_fix_places_companion_once() {
    let temp = TempDir::new().unwrap();
    let mut store = setup(&temp);

    let first = actions::fix_controller(&mut store, &mut Recorder::new()).unwrap();
    assert!(first.companion_placed);
    temp.child("steam/controller_base/templates/controller_neptune.vdf").assert("tpl");
    let placed = temp.child(format!("steam/controller_config/{COMPANION_FILE_NAME}"));
    placed.assert("actions");
    // shipped file stays where it was
    temp.child(format!("res/{COMPANION_FILE_NAME}")).assert("actions");

    // operator edits the placed file; a second fix must not clobber it
    placed.write_str("customized").unwrap();
    let reloaded_flag = SettingsStore::load(store.path()).unwrap().is_action_done(ActionFlag::CompanionFileMoved);
    assert!(reloaded_flag);
    let second = actions::fix_controller(&mut store, &mut Recorder::new()).unwrap();
    assert!(!second.companion_placed);
    placed.assert("customized");
}

#[test]
fn controller_fix_failure_leaves_flag_unset() {
    let temp = TempDir::new().unwrap();
    let mut store = setup(&temp);
    fs::remove_file(temp.child(format!("res/{COMPANION_FILE_NAME}")).path()).unwrap();

    let err = actions::fix_controller(&mut store, &mut Recorder::new()).unwrap_err();
    assert!(matches!(err.downcast_ref::<LaunchSyncError>(), Some(LaunchSyncError::SourceMissing(_))));
    assert!(!store.is_action_done(ActionFlag::CompanionFileMoved));
}

#[test]
fn mod_apply_then_reset() {
    let temp = TempDir::new().unwrap();
    let store = setup(&temp);

    let err = actions::reset_to_normal(store.config(), &mut Recorder::new()).unwrap_err();
    assert_eq!(err.downcast_ref::<LaunchSyncError>().map(|e| e.code()), Some(10));

    let out = actions::apply_mod(store.config(), "hard", &mut Recorder::new()).unwrap();
    assert!(out.backup_created);
    temp.child(format!("install/Game/{PAYLOAD_FILE}")).assert("hard");
    temp.child(format!("install/Game/backups/original/{PAYLOAD_FILE}")).assert("factory");

    actions::reset_to_normal(store.config(), &mut Recorder::new()).unwrap();
    temp.child(format!("install/Game/{PAYLOAD_FILE}")).assert("factory");
}

#[test]
fn player_count_edits_ini_and_settings() {
    let temp = TempDir::new().unwrap();
    let mut store = setup(&temp);

    actions::set_player_count(&mut store, 2, &mut Recorder::new()).unwrap();
    temp.child("install/Game/SeamlessCoop/nrsc_settings.ini")
        .assert("[GAMEPLAY]\n    player_count = 2\n");
    assert_eq!(store.config().player_count, 2);

    let err = actions::set_player_count(&mut store, 0, &mut Recorder::new()).unwrap_err();
    assert!(matches!(err.downcast_ref::<LaunchSyncError>(), Some(LaunchSyncError::InvalidSetting(_))));
    assert_eq!(store.config().player_count, 2);
}

#[test]
fn set_installation_accepts_parent_and_rejects_other_folders() {
    let temp = TempDir::new().unwrap();
    let mut store = setup(&temp);
    let before = store.get(SettingKey::InstallationDir);

    let err = actions::set_installation(&mut store, &temp.path().join("steam"), &mut Recorder::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LaunchSyncError>(),
        Some(LaunchSyncError::NotAnInstallation { .. })
    ));
    assert_eq!(store.get(SettingKey::InstallationDir), before);

    let got = actions::set_installation(&mut store, &temp.path().join("install"), &mut Recorder::new()).unwrap();
    assert_eq!(got, temp.path().join("install").join("Game"));
    let reloaded = SettingsStore::load(store.path()).unwrap();
    assert_eq!(reloaded.config().installation_dir, got);
}
