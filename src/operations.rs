//! Filesystem probe abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that drift classification can be
//! unit-tested without touching the real filesystem. Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries used for symlink drift checks.
///
/// Implement this trait to swap in a mock during unit tests, keeping the
/// classification logic independent of real I/O. The production
/// implementation is [`SystemFileSystemOps`].
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if a file or directory exists at `path`
    /// (following symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the entry at `path` is itself a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the target of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.is_file() || path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok_and(|m| m.is_symlink())
    }

    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure existing paths, symlinks, and probe failures with the
/// builder-style methods, then pass a reference to the checker under test.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: Vec<PathBuf>,
    symlinks: std::collections::HashMap<PathBuf, PathBuf>,
    failing: Vec<PathBuf>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as an existing regular file or directory.
    #[must_use]
    pub fn with_existing(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing.push(path.into());
        self
    }

    /// Mark `path` as an existing symlink pointing at `target`.
    #[must_use]
    pub fn with_symlink(mut self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.existing.push(p.clone());
        self.symlinks.insert(p, target.into());
        self
    }

    /// Make `read_link` on `path` fail with a permission error while the
    /// path still probes as an existing symlink.
    #[must_use]
    pub fn with_failing_link(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.existing.push(p.clone());
        self.failing.push(p);
        self
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.existing.iter().any(|p| p == path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.symlinks.contains_key(path) || self.failing.iter().any(|p| p == path)
    }

    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf> {
        if self.failing.iter().any(|p| p == path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "probe failed",
            ));
        }
        self.symlinks.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a symlink")
        })
    }
}
