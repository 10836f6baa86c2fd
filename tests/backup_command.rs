#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `backup` command path — snapshot creation,
//! listing, and restore against a real filesystem.

mod common;

use driftwatch::backup::fsops::SidecarFileBackup;
use driftwatch::backup::{RestoreStatus, SnapshotStore};
use driftwatch::cancel::CancelToken;

/// Full round trip: snapshot two files, clobber the originals, restore,
/// and verify the clobbered content was stashed to a `.bak` sidecar first.
#[test]
fn snapshot_and_restore_round_trip() {
    let ctx = common::IntegrationTestContext::new();
    let hosts = ctx.root_path().join("hosts");
    let rc = ctx.root_path().join("bashrc");
    std::fs::write(&hosts, "127.0.0.1 localhost").unwrap();
    std::fs::write(&rc, "alias ll='ls -l'").unwrap();

    let store = SnapshotStore::new(ctx.root_path().join("backups"));
    let snapshot = store
        .create(&[hosts.clone(), rc.clone()], &CancelToken::new())
        .expect("create snapshot")
        .expect("snapshot written");
    assert_eq!(snapshot.entries.len(), 2);

    std::fs::write(&hosts, "tampered").unwrap();
    std::fs::remove_file(&rc).unwrap();

    let outcomes = store
        .restore(&snapshot.id, None, &SidecarFileBackup, &CancelToken::new())
        .expect("restore snapshot");
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == RestoreStatus::Restored));

    assert_eq!(
        std::fs::read_to_string(&hosts).unwrap(),
        "127.0.0.1 localhost"
    );
    assert_eq!(std::fs::read_to_string(&rc).unwrap(), "alias ll='ls -l'");

    // The tampered hosts file was stashed before being overwritten.
    let sidecars: Vec<_> = std::fs::read_dir(ctx.root_path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
        .collect();
    assert_eq!(sidecars.len(), 1);
    assert_eq!(
        std::fs::read_to_string(sidecars[0].path()).unwrap(),
        "tampered"
    );
}

/// Restore with a filter touches only the named entry.
#[test]
fn filtered_restore_leaves_other_entries_alone() {
    let ctx = common::IntegrationTestContext::new();
    let a = ctx.root_path().join("a.conf");
    let b = ctx.root_path().join("b.conf");
    std::fs::write(&a, "aaa").unwrap();
    std::fs::write(&b, "bbb").unwrap();

    let store = SnapshotStore::new(ctx.root_path().join("backups"));
    let snapshot = store
        .create(&[a.clone(), b.clone()], &CancelToken::new())
        .unwrap()
        .unwrap();

    std::fs::write(&a, "changed-a").unwrap();
    std::fs::write(&b, "changed-b").unwrap();

    let outcomes = store
        .restore(
            &snapshot.id,
            Some("A.CONF"),
            &SidecarFileBackup,
            &CancelToken::new(),
        )
        .unwrap();
    // Filter matching ignores case.
    assert_eq!(outcomes.len(), 1);
    assert_eq!(std::fs::read_to_string(&a).unwrap(), "aaa");
    assert_eq!(std::fs::read_to_string(&b).unwrap(), "changed-b");
}

/// Snapshots of nonexistent paths are not created at all.
#[test]
fn snapshot_of_missing_paths_writes_nothing() {
    let ctx = common::IntegrationTestContext::new();
    let store = SnapshotStore::new(ctx.root_path().join("backups"));

    let result = store
        .create(
            &[ctx.root_path().join("ghost.conf")],
            &CancelToken::new(),
        )
        .unwrap();
    assert!(result.is_none());
    assert!(store.list().unwrap().is_empty());
}

/// Directory targets are copied recursively into the snapshot.
#[test]
fn snapshot_preserves_directory_trees() {
    let ctx = common::IntegrationTestContext::new();
    let conf_dir = ctx.root_path().join("app");
    std::fs::create_dir_all(conf_dir.join("sub")).unwrap();
    std::fs::write(conf_dir.join("top.toml"), "top").unwrap();
    std::fs::write(conf_dir.join("sub/nested.toml"), "nested").unwrap();

    let store = SnapshotStore::new(ctx.root_path().join("backups"));
    let snapshot = store
        .create(&[conf_dir.clone()], &CancelToken::new())
        .unwrap()
        .unwrap();

    std::fs::remove_dir_all(&conf_dir).unwrap();
    let outcomes = store
        .restore(&snapshot.id, None, &SidecarFileBackup, &CancelToken::new())
        .unwrap();
    assert!(outcomes.iter().all(|o| o.status == RestoreStatus::Restored));
    assert_eq!(
        std::fs::read_to_string(conf_dir.join("sub/nested.toml")).unwrap(),
        "nested"
    );
}

/// Listing returns snapshots newest first.
#[test]
fn list_orders_newest_first() {
    let ctx = common::IntegrationTestContext::new();
    let file = ctx.root_path().join("x.conf");
    std::fs::write(&file, "x").unwrap();

    let store = SnapshotStore::new(ctx.root_path().join("backups"));
    let first = store
        .create(std::slice::from_ref(&file), &CancelToken::new())
        .unwrap()
        .unwrap();
    let second = store
        .create(std::slice::from_ref(&file), &CancelToken::new())
        .unwrap()
        .unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

/// Restoring an unknown snapshot id reports an error outcome instead of
/// touching the filesystem.
#[test]
fn restore_unknown_snapshot_is_a_structured_error() {
    let ctx = common::IntegrationTestContext::new();
    let store = SnapshotStore::new(ctx.root_path().join("backups"));

    let outcomes = store
        .restore(
            "2026-01-01_00-00-00",
            None,
            &SidecarFileBackup,
            &CancelToken::new(),
        )
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, RestoreStatus::Error);
    assert!(outcomes[0].message.contains("does not exist"));
}
