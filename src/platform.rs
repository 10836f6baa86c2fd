//! Platform detection and per-user storage defaults.
//!
//! The engine itself never decides where its artifacts live; commands obtain
//! default locations from here and pass explicit paths down. Storage policy:
//! a Windows application-data root (`%APPDATA%\driftwatch`) or a Unix-style
//! dotfile-config root (`$XDG_CONFIG_HOME/driftwatch`, falling back to
//! `~/.config/driftwatch`).

use std::fmt;
use std::path::PathBuf;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Unix,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Unix
        };
        Self { os }
    }

    /// Create a platform with an explicit OS (for testing).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether this platform exposes an OS registry.
    #[must_use]
    pub fn has_registry(&self) -> bool {
        self.os == Os::Windows
    }

    /// Per-user application data root for engine artifacts.
    #[must_use]
    pub fn data_root(&self) -> PathBuf {
        match self.os {
            Os::Windows => std::env::var_os("APPDATA").map_or_else(
                || PathBuf::from("driftwatch"),
                |appdata| PathBuf::from(appdata).join("driftwatch"),
            ),
            Os::Unix => std::env::var_os("XDG_CONFIG_HOME").map_or_else(
                || {
                    std::env::var_os("HOME").map_or_else(
                        || PathBuf::from(".driftwatch"),
                        |home| PathBuf::from(home).join(".config").join("driftwatch"),
                    )
                },
                |xdg| PathBuf::from(xdg).join("driftwatch"),
            ),
        }
    }

    /// Default root directory holding timestamped backup snapshots.
    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        self.data_root().join("backups")
    }

    /// Default slot file holding the active tree-diff baseline.
    #[must_use]
    pub fn diff_slot(&self) -> PathBuf {
        self.data_root().join("diff-snapshot.json")
    }
}
