use assert_fs::prelude::*;
use std::path::PathBuf;

use launch_sync::resolve::{KNOWN_SUBDIRS, MARKER_FILE};
use launch_sync::{LaunchSyncError, require_installation, resolve_installation};

#[test]
fn marker_in_chosen_folder() {
    let x = assert_fs::TempDir::new().unwrap();
    x.child("game.exe").touch().unwrap();
    x.child("Game/game.exe").touch().unwrap();
    assert_eq!(
        resolve_installation(x.path(), "game.exe", &["Game"]),
        Some(x.path().to_path_buf())
    );
}

#[test]
fn marker_in_known_subdir() {
    let x = assert_fs::TempDir::new().unwrap();
    x.child("Game/game.exe").touch().unwrap();
    assert_eq!(
        resolve_installation(x.path(), "game.exe", &["Game"]),
        Some(x.path().join("Game"))
    );
}

#[test]
fn no_marker_anywhere() {
    let x = assert_fs::TempDir::new().unwrap();
    x.child("Other/game.exe").touch().unwrap();
    assert_eq!(resolve_installation(x.path(), "game.exe", &["Game"]), None);
    let owned: Vec<String> = vec!["Game".into()];
    assert_eq!(resolve_installation(x.path(), "game.exe", &owned), None);
}

#[test]
fn default_marker_through_parent_folder() {
    let x = assert_fs::TempDir::new().unwrap();
    x.child(format!("{}/{}", KNOWN_SUBDIRS[0], MARKER_FILE)).touch().unwrap();
    assert_eq!(require_installation(x.path()).unwrap(), x.path().join("Game"));

    let missing = PathBuf::from(x.path()).join("nope");
    assert!(matches!(
        require_installation(&missing),
        Err(LaunchSyncError::NotAnInstallation { .. })
    ));
}
