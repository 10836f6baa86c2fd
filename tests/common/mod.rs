// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed configuration root and small
// builders so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;

use driftwatch::config::Config;

/// An isolated configuration root backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory containing the declaration files.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a new context with empty declaration files.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join("links.toml"), "").expect("write links.toml");
        std::fs::write(root.path().join("tweaks.toml"), "").expect("write tweaks.toml");
        Self { root }
    }

    /// Path to the configuration root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Overwrite `links.toml` with the given TOML content.
    pub fn write_links(&self, toml: &str) {
        std::fs::write(self.root.path().join("links.toml"), toml).expect("write links.toml");
    }

    /// Overwrite `tweaks.toml` with the given TOML content.
    pub fn write_tweaks(&self, toml: &str) {
        std::fs::write(self.root.path().join("tweaks.toml"), toml).expect("write tweaks.toml");
    }

    /// Load the declaration files from this root.
    pub fn load_config(&self) -> Config {
        Config::load(self.root.path()).expect("load config")
    }
}
