use assert_fs::prelude::*;
use std::fs;
use std::time::Duration;

use launch_sync::mods::PAYLOAD_FILE;
use launch_sync::{LaunchSyncError, ModApplier, RetryPolicy};

fn applier() -> ModApplier {
    ModApplier::new(RetryPolicy::new(3, Duration::ZERO))
}

#[test]
fn backup_captured_once_and_second_payload_wins() {
    let temp = assert_fs::TempDir::new().unwrap();
    let install = temp.child("Game");
    install.child(PAYLOAD_FILE).write_str("factory").unwrap();
    let first = temp.child("mods/one.bin");
    first.write_str("mod one").unwrap();
    let second = temp.child("mods/two.bin");
    second.write_str("mod two").unwrap();

    let a = applier();
    let out1 = a.apply_payload(first.path(), install.path()).unwrap();
    assert!(out1.backup_created);
    let out2 = a.apply_payload(second.path(), install.path()).unwrap();
    assert!(!out2.backup_created);

    install.child(PAYLOAD_FILE).assert("mod two");
    assert_eq!(fs::read_to_string(a.backup_path(install.path())).unwrap(), "factory");
}

#[test]
fn reset_restores_backup_and_is_idempotent() {
    let temp = assert_fs::TempDir::new().unwrap();
    let install = temp.child("Game");
    install.child(PAYLOAD_FILE).write_str("factory").unwrap();
    let payload = temp.child("mod.bin");
    payload.write_str("modded").unwrap();

    let a = applier();
    a.apply_payload(payload.path(), install.path()).unwrap();
    assert_eq!(a.reset_to_original(install.path()).unwrap(), 1);
    install.child(PAYLOAD_FILE).assert("factory");
    assert_eq!(a.reset_to_original(install.path()).unwrap(), 1);
    install.child(PAYLOAD_FILE).assert("factory");

    // repeated apply keeps the same end state
    a.apply_payload(payload.path(), install.path()).unwrap();
    a.apply_payload(payload.path(), install.path()).unwrap();
    install.child(PAYLOAD_FILE).assert("modded");
    assert_eq!(fs::read_to_string(a.backup_path(install.path())).unwrap(), "factory");
}

#[test]
fn reset_before_any_apply_is_backup_missing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let install = temp.child("Game");
    install.child(PAYLOAD_FILE).write_str("factory").unwrap();

    let err = applier().reset_to_original(install.path()).unwrap_err();
    assert!(matches!(err, LaunchSyncError::BackupMissing { .. }), "{err:?}");
    assert_eq!(err.code(), 10);
    assert!(err.kind().is_none());
    install.child(PAYLOAD_FILE).assert("factory");
}
