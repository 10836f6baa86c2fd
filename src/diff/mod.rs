//! Content-hash snapshots of directory trees and their comparison.
//!
//! `capture` fingerprints every file under a root (SHA-256 + byte length,
//! keyed by `/`-normalised relative path, sorted ordinally) and persists the
//! baseline to a slot file, returning a [`DiffSession`] handle. A session
//! can be `resume`d from the slot in a later process; comparing re-scans the
//! stored root with the same algorithm and reports added, modified, and
//! deleted paths. [`DiffSession::finish`] consumes the slot on success —
//! the one-shot capture-then-compare lifecycle — while
//! [`DiffSession::changes`] leaves the baseline in place for repeated
//! comparison. Distinct slot paths give fully independent sessions.
//!
//! Files are hash-addressed, not mtime-addressed: a file rewritten with
//! identical bytes shows no change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};

/// Fingerprint of one file, relative to the capture root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// `/`-separated path relative to the root.
    pub relative_path: String,
    /// File size in bytes.
    pub length: u64,
    /// Lowercase hex SHA-256 of the content.
    pub hash: String,
}

/// A captured baseline: root, capture time, and sorted file fingerprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    /// Canonical absolute root the capture walked.
    pub root_path: PathBuf,
    /// UTC capture time.
    pub captured_at: DateTime<Utc>,
    /// Fingerprints sorted by relative path (ordinal).
    pub files: Vec<FileRecord>,
}

/// Kind of change between baseline and re-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present after but not before.
    Added,
    /// Present in both with differing content hash.
    Modified,
    /// Present before but not after.
    Deleted,
}

/// One changed path; unchanged files never appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChange {
    /// `/`-separated path relative to the root.
    pub relative_path: String,
    /// What happened to it.
    pub kind: ChangeKind,
}

/// Engine over one baseline slot file.
#[derive(Debug)]
pub struct TreeDiff {
    slot: PathBuf,
}

impl TreeDiff {
    /// Create an engine over the given slot path. Independent sessions use
    /// independent slots.
    #[must_use]
    pub fn new(slot: PathBuf) -> Self {
        Self { slot }
    }

    /// Whether a baseline currently occupies the slot.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.slot.is_file()
    }

    /// Capture a baseline of `root` and persist it, overwriting any prior
    /// slot content.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `root` is not an existing directory, an I/O
    /// error when scanning or persisting fails, and `Cancelled` when the
    /// token is raised mid-walk (no slot is written then).
    pub fn capture(&self, root: &Path, cancel: &CancelToken) -> Result<DiffSession> {
        let snapshot = scan_tree(root, cancel)?;
        self.persist(&snapshot)?;
        Ok(DiffSession {
            slot: self.slot.clone(),
            snapshot,
        })
    }

    /// Reload the persisted baseline as a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the slot is empty — capture must run
    /// first — and `Corrupt` when the slot cannot be parsed.
    pub fn resume(&self) -> Result<DiffSession> {
        if !self.has_snapshot() {
            return Err(EngineError::InvalidState(
                "no captured snapshot; run capture first".to_string(),
            ));
        }
        let bytes = std::fs::read(&self.slot).map_err(|e| EngineError::io(&self.slot, e))?;
        let snapshot: TreeSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| EngineError::Corrupt {
                what: "snapshot",
                path: self.slot.clone(),
                message: e.to_string(),
            })?;
        Ok(DiffSession {
            slot: self.slot.clone(),
            snapshot,
        })
    }

    fn persist(&self, snapshot: &TreeSnapshot) -> Result<()> {
        if let Some(parent) = self.slot.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| EngineError::io(&self.slot, std::io::Error::other(e)))?;
        std::fs::write(&self.slot, json).map_err(|e| EngineError::io(&self.slot, e))
    }
}

/// A live baseline bound to its slot.
#[derive(Debug)]
pub struct DiffSession {
    slot: PathBuf,
    snapshot: TreeSnapshot,
}

impl DiffSession {
    /// The captured baseline.
    #[must_use]
    pub const fn snapshot(&self) -> &TreeSnapshot {
        &self.snapshot
    }

    /// Re-scan the stored root and diff against the baseline, leaving the
    /// baseline in place for further comparisons.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the stored root no longer exists, an I/O
    /// error when re-scanning fails, or `Cancelled`.
    pub fn changes(&self, cancel: &CancelToken) -> Result<Vec<DiffChange>> {
        let after = scan_tree(&self.snapshot.root_path, cancel)?;
        Ok(diff_snapshots(&self.snapshot, &after))
    }

    /// Compare once and consume the baseline: on success the slot file is
    /// deleted, ending the session.
    ///
    /// # Errors
    ///
    /// Same as [`Self::changes`]; additionally an I/O error when the slot
    /// cannot be removed. On error the slot survives for a retry.
    pub fn finish(self, cancel: &CancelToken) -> Result<Vec<DiffChange>> {
        let changes = self.changes(cancel)?;
        std::fs::remove_file(&self.slot).map_err(|e| EngineError::io(&self.slot, e))?;
        Ok(changes)
    }
}

/// Walk `root` and fingerprint every file, sorted by relative path.
fn scan_tree(root: &Path, cancel: &CancelToken) -> Result<TreeSnapshot> {
    let canonical = dunce::canonicalize(root)
        .map_err(|_| EngineError::NotFound(format!("directory does not exist: {}", root.display())))?;
    if !canonical.is_dir() {
        return Err(EngineError::NotFound(format!(
            "not a directory: {}",
            canonical.display()
        )));
    }

    let mut files = Vec::new();
    walk(&canonical, &canonical, cancel, &mut files)?;
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(TreeSnapshot {
        root_path: canonical,
        captured_at: Utc::now(),
        files,
    })
}

fn walk(
    root: &Path,
    dir: &Path,
    cancel: &CancelToken,
    out: &mut Vec<FileRecord>,
) -> Result<()> {
    let reader = std::fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
    for entry in reader {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, cancel, out)?;
            continue;
        }
        cancel.check()?;
        let length = std::fs::metadata(&path)
            .map_err(|e| EngineError::io(&path, e))?
            .len();
        out.push(FileRecord {
            relative_path: relative_key(root, &path),
            length,
            hash: hash_file(&path)?,
        });
    }
    Ok(())
}

/// `/`-normalised path of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let s = rel.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.to_string()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Lowercase hex SHA-256 of the file at `path`, streamed.
fn hash_file(path: &Path) -> Result<String> {
    use std::fmt::Write as _;

    let mut file = std::fs::File::open(path).map_err(|e| EngineError::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| EngineError::io(path, e))?;
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Symmetric diff of two snapshots, sorted by relative path.
fn diff_snapshots(before: &TreeSnapshot, after: &TreeSnapshot) -> Vec<DiffChange> {
    let old: BTreeMap<&str, &str> = before
        .files
        .iter()
        .map(|f| (f.relative_path.as_str(), f.hash.as_str()))
        .collect();
    let new: BTreeMap<&str, &str> = after
        .files
        .iter()
        .map(|f| (f.relative_path.as_str(), f.hash.as_str()))
        .collect();

    let mut changes = Vec::new();
    for (path, hash) in &new {
        match old.get(path) {
            None => changes.push(DiffChange {
                relative_path: (*path).to_string(),
                kind: ChangeKind::Added,
            }),
            Some(old_hash) if old_hash != hash => changes.push(DiffChange {
                relative_path: (*path).to_string(),
                kind: ChangeKind::Modified,
            }),
            Some(_) => {}
        }
    }
    for path in old.keys() {
        if !new.contains_key(path) {
            changes.push(DiffChange {
                relative_path: (*path).to_string(),
                kind: ChangeKind::Deleted,
            });
        }
    }
    changes.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    changes
}
