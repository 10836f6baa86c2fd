//! Copy primitives and the single-file backup capability.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{EngineError, Result};

/// Recursion ceiling for directory copies. Symlinked subdirectories are
/// followed and their contents copied, so a link cycle would otherwise
/// recurse forever; past this depth the copy fails instead.
pub const MAX_COPY_DEPTH: usize = 64;

/// Capability that stashes one live file before it is overwritten.
///
/// The exact naming and rotation of backup copies is the implementor's
/// concern; the engine only requires that a copy exists afterwards.
pub trait FileBackup: Send + Sync + std::fmt::Debug {
    /// Copy `path` to a backup location, returning where the copy landed.
    ///
    /// # Errors
    ///
    /// Returns an error when the copy fails.
    fn backup_file(&self, path: &Path) -> Result<PathBuf>;
}

/// Production [`FileBackup`] that writes a timestamped `.bak` sibling,
/// e.g. `settings.json` -> `settings.json.2026-08-30_12-00-00.bak`.
#[derive(Debug, Default)]
pub struct SidecarFileBackup;

impl FileBackup for SidecarFileBackup {
    fn backup_file(&self, path: &Path) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        let name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().to_string());
        let dest = path.with_file_name(format!("{name}.{stamp}.bak"));
        std::fs::copy(path, &dest).map_err(|e| EngineError::io(path, e))?;
        Ok(dest)
    }
}

/// Copy a file or directory tree to `dst`.
///
/// Directories are copied recursively, file by file. Symlinks within the
/// source tree are followed (their content is materialised, not the link),
/// bounded by [`MAX_COPY_DEPTH`].
///
/// # Errors
///
/// Returns an I/O error when any read or write fails, or when the recursion
/// ceiling is exceeded.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_bounded(src, dst, 0)
    } else {
        std::fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| EngineError::io(src, e))
    }
}

fn copy_dir_bounded(src: &Path, dst: &Path, depth: usize) -> Result<()> {
    if depth >= MAX_COPY_DEPTH {
        return Err(EngineError::io(
            src,
            std::io::Error::other(format!("directory nesting exceeds {MAX_COPY_DEPTH} levels")),
        ));
    }
    std::fs::create_dir_all(dst).map_err(|e| EngineError::io(dst, e))?;
    let reader = std::fs::read_dir(src).map_err(|e| EngineError::io(src, e))?;
    for entry in reader {
        let entry = entry.map_err(|e| EngineError::io(src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_bounded(&src_path, &dst_path, depth + 1)?;
        } else {
            std::fs::copy(&src_path, &dst_path).map_err(|e| EngineError::io(&src_path, e))?;
        }
    }
    Ok(())
}
