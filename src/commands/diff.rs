//! The `diff` command: tree baseline capture and comparison.

use anyhow::Result;
use std::path::Path;

use crate::cancel::CancelToken;
use crate::cli::{DiffAction, GlobalOpts};
use crate::diff::{ChangeKind, TreeDiff};
use crate::logging::Logger;
use crate::platform::Platform;

/// Run the `diff` command.
///
/// # Errors
///
/// Returns an error if the target directory does not exist, no baseline has
/// been captured for `compare`, the baseline slot cannot be read or
/// written, or the run is cancelled.
pub fn run(
    global: &GlobalOpts,
    action: &DiffAction,
    log: &Logger,
    cancel: &CancelToken,
) -> Result<()> {
    // Declarations are not needed; the slot location is per-user state.
    let platform = Platform::detect();
    let engine = TreeDiff::new(platform.diff_slot());

    match action {
        DiffAction::Capture { path } => capture(&engine, path, global.dry_run, log, cancel),
        DiffAction::Compare { keep } => compare(&engine, *keep, log, cancel),
    }
}

fn capture(
    engine: &TreeDiff,
    path: &Path,
    dry_run: bool,
    log: &Logger,
    cancel: &CancelToken,
) -> Result<()> {
    log.stage("Capturing baseline");
    if dry_run {
        log.dry_run(&format!("would capture a baseline of {}", path.display()));
        return Ok(());
    }
    if engine.has_snapshot() {
        log.warn("replacing the existing baseline");
    }

    let session = engine.capture(path, cancel)?;
    log.info(&format!(
        "captured {} file(s) under {}",
        session.snapshot().files.len(),
        session.snapshot().root_path.display()
    ));
    Ok(())
}

fn compare(engine: &TreeDiff, keep: bool, log: &Logger, cancel: &CancelToken) -> Result<()> {
    log.stage("Comparing against baseline");
    let session = engine.resume()?;
    let root = session.snapshot().root_path.clone();

    let changes = if keep {
        session.changes(cancel)?
    } else {
        session.finish(cancel)?
    };

    if changes.is_empty() {
        log.info(&format!("no changes under {}", root.display()));
    } else {
        for change in &changes {
            let tag = match change.kind {
                ChangeKind::Added => "added",
                ChangeKind::Modified => "modified",
                ChangeKind::Deleted => "deleted",
            };
            log.info(&format!("{tag:>9}  {}", change.relative_path));
        }
        log.info(&format!("{} change(s) under {}", changes.len(), root.display()));
    }
    if keep {
        log.debug("baseline kept for further comparisons");
    }
    Ok(())
}
