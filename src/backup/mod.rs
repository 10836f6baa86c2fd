//! Timestamped, manifest-described file backups.
//!
//! A snapshot is a directory under the backup root named by its UTC creation
//! time at one-second resolution (`2026-08-30_12-00-00`), holding a copy of
//! each backed-up path (final path component only) plus a pretty-printed
//! JSON manifest mapping copied names back to their original absolute
//! paths. The manifest is the sole source of truth for restore: a snapshot
//! directory without one is "legacy" — listable, never restorable.
//!
//! When two snapshots are created within the same second, the later one gets
//! a monotonic `-2`, `-3`… suffix after the timestamp, keeping IDs unique
//! and lexically sortable by their timestamp prefix.

pub mod fsops;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use fsops::{FileBackup, copy_path};

/// Manifest file name inside each snapshot directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Snapshot ID timestamp format; always 19 characters.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const TIMESTAMP_LEN: usize = 19;

/// One manifest line: a copied name and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Name of the copy inside the snapshot directory.
    pub file_name: String,
    /// Original absolute path the copy was taken from.
    pub original_path: PathBuf,
}

/// A backup snapshot on disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Directory name: timestamp, optionally `-N` suffixed.
    pub id: String,
    /// Absolute snapshot directory.
    pub dir: PathBuf,
    /// Creation time parsed from the ID.
    pub created_at: DateTime<Utc>,
    /// Manifest entries; empty for legacy snapshots.
    pub entries: Vec<ManifestEntry>,
    /// Whether a manifest was present. Restore requires one.
    pub has_manifest: bool,
}

/// Outcome status of one restored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStatus {
    /// The original path now holds the snapshot copy.
    Restored,
    /// This entry could not be restored; others were still attempted.
    Error,
}

/// Per-entry restore result record.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// Copied name this outcome refers to (or the snapshot ID for
    /// whole-snapshot failures).
    pub file_name: String,
    /// Outcome status.
    pub status: RestoreStatus,
    /// Human-readable detail.
    pub message: String,
}

impl RestoreOutcome {
    fn error(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            status: RestoreStatus::Error,
            message: message.into(),
        }
    }
}

/// Creates, lists, and restores timestamped backup snapshots under a root
/// directory.
#[derive(Debug)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Create a store over `root`. The directory is created lazily on the
    /// first snapshot.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Backup root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a snapshot of every input path that currently exists.
    ///
    /// Returns `Ok(None)` when none of the inputs exist — nothing is
    /// written in that case. Directories are copied recursively; only the
    /// final path component survives as the name inside the snapshot.
    /// Cancellation between entries stops copying; paths already copied
    /// stay in the manifest and the partial snapshot is returned.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the snapshot directory or manifest cannot
    /// be written, or when copying an individual path fails.
    pub fn create(
        &self,
        targets: &[PathBuf],
        cancel: &CancelToken,
    ) -> Result<Option<Snapshot>> {
        let existing: Vec<&PathBuf> = targets.iter().filter(|p| p.exists()).collect();
        if existing.is_empty() {
            return Ok(None);
        }

        let created_at = Utc::now();
        let (id, dir) = self.allocate_dir(created_at)?;

        let mut entries = Vec::with_capacity(existing.len());
        for target in existing {
            if cancel.is_cancelled() {
                break;
            }
            let file_name = target
                .file_name()
                .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().to_string());
            copy_path(target, &dir.join(&file_name))?;
            entries.push(ManifestEntry {
                file_name,
                original_path: target.clone(),
            });
        }

        let manifest = serde_json::to_vec_pretty(&entries)
            .map_err(|e| EngineError::io(&dir, std::io::Error::other(e)))?;
        let manifest_path = dir.join(MANIFEST_FILE);
        std::fs::write(&manifest_path, manifest).map_err(|e| EngineError::io(&manifest_path, e))?;

        Ok(Some(Snapshot {
            id,
            dir,
            created_at,
            entries,
            has_manifest: true,
        }))
    }

    /// Allocate a fresh snapshot directory. Same-second creations get a
    /// monotonic `-2`, `-3`… suffix instead of overwriting.
    fn allocate_dir(&self, created_at: DateTime<Utc>) -> Result<(String, PathBuf)> {
        let base = created_at.format(TIMESTAMP_FORMAT).to_string();
        let mut id = base.clone();
        let mut counter = 2u32;
        loop {
            let dir = self.root.join(&id);
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
                return Ok((id, dir));
            }
            id = format!("{base}-{counter}");
            counter += 1;
        }
    }

    /// Enumerate snapshots under the root, newest first.
    ///
    /// Directory names that do not start with a valid timestamp are
    /// ignored. A missing or unparseable manifest yields a legacy snapshot
    /// with an empty entry list.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the backup root exists but cannot be read.
    pub fn list(&self) -> Result<Vec<Snapshot>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let reader = std::fs::read_dir(&self.root).map_err(|e| EngineError::io(&self.root, e))?;
        let mut snapshots = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|e| EngineError::io(&self.root, e))?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();
            let Some(created_at) = parse_snapshot_id(&id) else {
                continue;
            };
            let (entries, has_manifest) = match read_manifest(&dir) {
                Some(entries) => (entries, true),
                None => (Vec::new(), false),
            };
            snapshots.push(Snapshot {
                id,
                dir,
                created_at,
                entries,
                has_manifest,
            });
        }
        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(snapshots)
    }

    /// Restore a snapshot's entries to their original paths.
    ///
    /// `filter`, when given, selects a single entry by exact file name
    /// (case-insensitive). A live file at an original path is backed up via
    /// `backup` before being overwritten. Restore is best-effort, not
    /// atomic: each entry's failure is reported and the rest continue, and
    /// a failure on entry K does not roll back entries 1..K-1. A missing
    /// snapshot or absent manifest yields a single error outcome and no
    /// filesystem mutation.
    ///
    /// # Errors
    ///
    /// This call itself only fails on cancellation before the first entry;
    /// all per-entry failures are reported in the returned outcomes.
    pub fn restore(
        &self,
        id: &str,
        filter: Option<&str>,
        backup: &dyn FileBackup,
        cancel: &CancelToken,
    ) -> Result<Vec<RestoreOutcome>> {
        let dir = self.root.join(id);
        if !dir.is_dir() {
            return Ok(vec![RestoreOutcome::error(
                id,
                format!("snapshot '{id}' does not exist"),
            )]);
        }
        if !dir.join(MANIFEST_FILE).is_file() {
            return Ok(vec![RestoreOutcome::error(
                id,
                format!("snapshot '{id}' has no manifest; legacy snapshots cannot be restored"),
            )]);
        }
        let Some(entries) = read_manifest(&dir) else {
            return Ok(vec![RestoreOutcome::error(
                id,
                format!("snapshot '{id}' manifest is unreadable"),
            )]);
        };

        let mut outcomes = Vec::new();
        for entry in &entries {
            if cancel.is_cancelled() {
                // Partial outcomes already produced stay valid.
                break;
            }
            if let Some(wanted) = filter
                && !entry.file_name.eq_ignore_ascii_case(wanted)
            {
                continue;
            }
            outcomes.push(restore_entry(&dir, entry, backup));
        }
        Ok(outcomes)
    }
}

/// Restore one manifest entry; every failure is captured in the outcome.
fn restore_entry(dir: &Path, entry: &ManifestEntry, backup: &dyn FileBackup) -> RestoreOutcome {
    let stored = dir.join(&entry.file_name);
    if !stored.exists() {
        return RestoreOutcome::error(
            &entry.file_name,
            format!("'{}' is missing from the snapshot", entry.file_name),
        );
    }

    if entry.original_path.is_file() {
        if let Err(e) = backup.backup_file(&entry.original_path) {
            return RestoreOutcome::error(
                &entry.file_name,
                format!("pre-restore backup failed: {e}"),
            );
        }
    }

    if let Some(parent) = entry.original_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        return RestoreOutcome::error(
            &entry.file_name,
            format!("cannot create {}: {e}", parent.display()),
        );
    }

    match copy_path(&stored, &entry.original_path) {
        Ok(()) => RestoreOutcome {
            file_name: entry.file_name.clone(),
            status: RestoreStatus::Restored,
            message: format!("restored {}", entry.original_path.display()),
        },
        Err(e) => RestoreOutcome::error(&entry.file_name, e.to_string()),
    }
}

/// Parse a snapshot directory name: a 19-character timestamp, optionally
/// followed by a `-N` disambiguating suffix.
fn parse_snapshot_id(id: &str) -> Option<DateTime<Utc>> {
    let stamp = id.get(..TIMESTAMP_LEN)?;
    let parsed = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    match id.get(TIMESTAMP_LEN..) {
        None | Some("") => {}
        Some(rest) => {
            let digits = rest.strip_prefix('-')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }
    }
    Some(parsed.and_utc())
}

/// Read and parse a snapshot manifest; `None` when absent or unparseable.
fn read_manifest(dir: &Path) -> Option<Vec<ManifestEntry>> {
    let bytes = std::fs::read(dir.join(MANIFEST_FILE)).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::warn!("unparseable manifest in {}: {e}", dir.display());
            None
        }
    }
}
