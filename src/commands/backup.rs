//! The `backup` command: snapshot creation, listing, and restore.

use anyhow::Result;
use std::path::PathBuf;

use crate::backup::fsops::SidecarFileBackup;
use crate::backup::{RestoreStatus, SnapshotStore};
use crate::cancel::CancelToken;
use crate::cli::{BackupAction, GlobalOpts};
use crate::logging::Logger;

/// Run the `backup` command.
///
/// # Errors
///
/// Returns an error if declarations fail to load, snapshot storage cannot
/// be read or written, or any restored entry fails.
pub fn run(
    global: &GlobalOpts,
    action: &BackupAction,
    log: &Logger,
    cancel: &CancelToken,
) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let store = SnapshotStore::new(setup.platform.backup_root());

    match action {
        BackupAction::Create { paths } => create(&setup, &store, paths, global.dry_run, log, cancel),
        BackupAction::List => list(&store, log),
        BackupAction::Restore { id, filter } => {
            restore(&store, id, filter.as_deref(), global.dry_run, log, cancel)
        }
    }
}

fn create(
    setup: &super::CommandSetup,
    store: &SnapshotStore,
    paths: &[PathBuf],
    dry_run: bool,
    log: &Logger,
    cancel: &CancelToken,
) -> Result<()> {
    log.stage("Creating snapshot");

    // Explicit paths win; otherwise snapshot every declared link target.
    let targets: Vec<PathBuf> = if paths.is_empty() {
        setup
            .config
            .links
            .iter()
            .map(|l| l.target.clone())
            .collect()
    } else {
        paths.to_vec()
    };
    if targets.is_empty() {
        log.info("nothing to back up");
        return Ok(());
    }

    if dry_run {
        for target in &targets {
            if target.exists() {
                log.dry_run(&format!("would snapshot {}", target.display()));
            } else {
                log.debug(&format!("skipping missing path {}", target.display()));
            }
        }
        return Ok(());
    }

    match store.create(&targets, cancel)? {
        Some(snapshot) => {
            log.info(&format!(
                "snapshot {} stored with {} file(s)",
                snapshot.id,
                snapshot.entries.len()
            ));
            if cancel.is_cancelled() {
                log.warn("interrupted; snapshot holds the entries copied so far");
            }
            Ok(())
        }
        None => {
            log.info("nothing to back up");
            Ok(())
        }
    }
}

fn list(store: &SnapshotStore, log: &Logger) -> Result<()> {
    log.stage("Stored snapshots");
    let snapshots = store.list()?;
    if snapshots.is_empty() {
        log.info("no snapshots stored");
        return Ok(());
    }
    for snapshot in &snapshots {
        if snapshot.has_manifest {
            log.info(&format!(
                "{}  {} file(s)",
                snapshot.id,
                snapshot.entries.len()
            ));
        } else {
            log.warn(&format!("{}  (no manifest; cannot restore)", snapshot.id));
        }
    }
    Ok(())
}

fn restore(
    store: &SnapshotStore,
    id: &str,
    filter: Option<&str>,
    dry_run: bool,
    log: &Logger,
    cancel: &CancelToken,
) -> Result<()> {
    log.stage("Restoring snapshot");

    if dry_run {
        let snapshots = store.list()?;
        let Some(snapshot) = snapshots.iter().find(|s| s.id == id) else {
            anyhow::bail!("snapshot '{id}' does not exist");
        };
        for entry in &snapshot.entries {
            if filter.is_none_or(|f| entry.file_name.eq_ignore_ascii_case(f)) {
                log.dry_run(&format!(
                    "would restore {} to {}",
                    entry.file_name,
                    entry.original_path.display()
                ));
            }
        }
        return Ok(());
    }

    let backup = SidecarFileBackup;
    let outcomes = store.restore(id, filter, &backup, cancel)?;
    let mut failures = 0u32;
    for outcome in &outcomes {
        match outcome.status {
            RestoreStatus::Restored => {
                log.info(&format!("{}: {}", outcome.file_name, outcome.message));
            }
            RestoreStatus::Error => {
                failures += 1;
                log.error(&format!("{}: {}", outcome.file_name, outcome.message));
            }
        }
    }
    if cancel.is_cancelled() {
        log.warn("interrupted; entries restored so far remain in place");
    }

    if failures > 0 {
        anyhow::bail!("{failures} restore outcome(s) failed");
    }
    log.info(&format!("{} file(s) restored", outcomes.len()));
    Ok(())
}
