//! Drift detection and change tracking engine.
//!
//! Compares observed machine state against declared state for two resource
//! kinds (symlinks and registry entries), applies and reverts registry
//! tweaks idempotently, keeps timestamped file backups with a durable
//! manifest, and diffs directory trees by content hash between two points
//! in time.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — parse the TOML declaration files
//! - **[`reconcile`]**, **[`backup`]**, **[`diff`]** — the engine: drift
//!   classification, apply/revert, snapshot/restore, tree diffing
//! - **[`registry`]**, **[`operations`]** — backend traits over the OS
//!   registry and filesystem, injected into the engine
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cancel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod reconcile;
pub mod registry;
