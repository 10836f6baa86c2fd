//! Domain-specific error types for the reconciliation engine.
//!
//! This module provides a structured error taxonomy using [`thiserror`].
//! Engine modules return [`EngineError`] while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! Batch operations (status checks, restore, apply/revert) never surface an
//! `EngineError` for a single failing item — those are reported as per-item
//! result records with a severity level. `EngineError` is reserved for
//! failures of the whole call: a missing capture root, an absent baseline
//! snapshot, a cancelled loop.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the reconciliation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required path, snapshot, or root directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation was attempted in a state that does not allow it
    /// (e.g., comparing a tree with no captured baseline).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An I/O failure on a single-shot operation.
    #[error("io failure on {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A registry access failure that affects the whole call.
    #[error("registry access failed: {0}")]
    Access(String),

    /// A malformed persisted artifact (manifest or baseline snapshot).
    #[error("corrupt {what} at {path}: {message}")]
    Corrupt {
        /// Kind of artifact that failed to parse.
        what: &'static str,
        /// Path of the artifact.
        path: PathBuf,
        /// Parser error message.
        message: String,
    },

    /// The operation was cancelled cooperatively; remaining work in the
    /// current call was abandoned.
    #[error("operation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the engine modules.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
