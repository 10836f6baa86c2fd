//! Symlink drift classification.
//!
//! Given resolved `(module, source, target)` triples — glob and environment
//! expansion happen upstream — classify each target against its declaration
//! and emit one report per triple as soon as it is computed, so callers can
//! surface progress without waiting for the batch. Probe failures are
//! captured per triple; only cancellation aborts the remaining batch.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::operations::FileSystemOps;

/// A resolved symlink declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkSpec {
    /// Label of the module this declaration came from.
    pub module: String,
    /// Declared source inside the config repository.
    pub source: PathBuf,
    /// Live path that should be a symlink to `source`.
    pub target: PathBuf,
}

/// Drift classification for one link triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Target is a symlink pointing at the declared source.
    Ok,
    /// Nothing exists at the target path.
    Missing,
    /// Target exists but is not the declared symlink.
    Drift,
    /// Probing the target failed.
    Error,
}

/// Per-triple classification report.
#[derive(Debug, Clone)]
pub struct LinkReport {
    /// Module label from the declaration.
    pub module: String,
    /// Declared source path.
    pub source: PathBuf,
    /// Live target path.
    pub target: PathBuf,
    /// Drift classification.
    pub status: LinkStatus,
    /// Human-readable detail.
    pub message: String,
}

/// Classify every triple in input order, emitting each report through
/// `emit` as soon as it is computed.
///
/// Returns `true` when any triple was not [`LinkStatus::Ok`].
///
/// # Errors
///
/// Returns [`EngineError::Cancelled`](crate::error::EngineError::Cancelled)
/// when the token is raised between triples; reports already emitted remain
/// valid but no aggregate is produced.
pub fn check_links<F>(
    links: &[LinkSpec],
    fs: &dyn FileSystemOps,
    cancel: &CancelToken,
    mut emit: F,
) -> Result<bool>
where
    F: FnMut(LinkReport),
{
    let mut any_drift = false;
    for link in links {
        cancel.check()?;
        let (status, message) = classify_target(&link.source, &link.target, fs);
        if status != LinkStatus::Ok {
            any_drift = true;
        }
        emit(LinkReport {
            module: link.module.clone(),
            source: link.source.clone(),
            target: link.target.clone(),
            status,
            message,
        });
    }
    Ok(any_drift)
}

/// Classify a single (source, target) pair.
fn classify_target(
    source: &Path,
    target: &Path,
    fs: &dyn FileSystemOps,
) -> (LinkStatus, String) {
    if !fs.exists(target) {
        return (LinkStatus::Missing, "Target does not exist".to_string());
    }
    if !fs.is_symlink(target) {
        return (
            LinkStatus::Drift,
            "Target is a regular file, not a symlink".to_string(),
        );
    }
    match fs.read_link(target) {
        Ok(actual) => {
            if paths_equal_fold(&actual, source) {
                (LinkStatus::Ok, "Link matches declaration".to_string())
            } else {
                (
                    LinkStatus::Drift,
                    format!(
                        "Link points to {}, expected {}",
                        actual.display(),
                        source.display()
                    ),
                )
            }
        }
        Err(e) => (LinkStatus::Error, e.to_string()),
    }
}

/// Compare two paths case-insensitively, normalising the `\\?\` prefix that
/// Windows `read_link` prepends to extended-length paths.
fn paths_equal_fold(a: &Path, b: &Path) -> bool {
    strip_win_prefix(a).eq_ignore_ascii_case(&strip_win_prefix(b))
}

fn strip_win_prefix(p: &Path) -> String {
    let s = p.to_string_lossy();
    s.strip_prefix(r"\\?\").unwrap_or(&s).to_string()
}
