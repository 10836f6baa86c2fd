//! Declaration file loading.
//!
//! The engine is driven by two TOML files in the configuration root:
//! `links.toml` (declared symlink triples) and `tweaks.toml` (declared
//! registry tweaks). Missing files deserialize as empty declaration sets so
//! a partial configuration root is usable.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::reconcile::links::LinkSpec;
use crate::reconcile::tweaks::Tweak;

/// All loaded declarations for one configuration root.
#[derive(Debug)]
pub struct Config {
    /// Declared symlink triples from `links.toml`.
    pub links: Vec<LinkSpec>,
    /// Declared registry tweaks from `tweaks.toml`.
    pub tweaks: Vec<Tweak>,
}

#[derive(Debug, Deserialize)]
struct LinksFile {
    #[serde(default)]
    links: Vec<LinkSpec>,
}

#[derive(Debug, Deserialize)]
struct TweaksFile {
    #[serde(default)]
    tweaks: Vec<Tweak>,
}

impl Config {
    /// Load `links.toml` and `tweaks.toml` from the configuration root.
    ///
    /// # Errors
    ///
    /// Returns an error if either file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let links: LinksFile =
            load_toml(&root.join("links.toml")).context("loading links.toml")?;
        let tweaks: TweaksFile =
            load_toml(&root.join("tweaks.toml")).context("loading tweaks.toml")?;
        Ok(Self {
            links: links.links,
            tweaks: tweaks.tweaks,
        })
    }
}

/// Deserialize a TOML file, treating a missing file as empty TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return toml::from_str("").context("Failed to create empty config");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::registry::RegistryValue;

    #[test]
    fn load_links_and_tweaks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("links.toml"),
            r#"[[links]]
module = "shell"
source = "/repo/bashrc"
target = "/home/u/.bashrc"

[[links]]
module = "editor"
source = "/repo/vimrc"
target = "/home/u/.vimrc"
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tweaks.toml"),
            r#"[[tweaks]]
id = "hide-search-box"
label = "Hide the taskbar search box"
reversible = true

[[tweaks.entries]]
key = "HKCU\\Software\\Microsoft\\Windows\\CurrentVersion\\Search"
name = "SearchboxTaskbarMode"
value = { kind = "dword", data = 0 }
default = { kind = "dword", data = 1 }
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.links.len(), 2);
        assert_eq!(config.links[0].module, "shell");
        assert_eq!(config.tweaks.len(), 1);
        assert_eq!(config.tweaks[0].id, "hide-search-box");
        assert!(config.tweaks[0].reversible);
        assert_eq!(
            config.tweaks[0].entries[0].value,
            RegistryValue::Dword(0)
        );
        assert_eq!(
            config.tweaks[0].entries[0].default,
            RegistryValue::Dword(1)
        );
    }

    #[test]
    fn missing_files_load_as_empty_sets() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.links.is_empty());
        assert!(config.tweaks.is_empty());
    }

    #[test]
    fn entry_without_declared_default_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tweaks.toml"),
            r#"[[tweaks]]
id = "one-way"
label = "No declared default"
reversible = false

[[tweaks.entries]]
key = "HKCU\\Software\\Example"
name = "Flag"
value = { kind = "string", data = "on" }
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(!config.tweaks[0].reversible);
        assert!(config.tweaks[0].entries[0].default.is_absent());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("links.toml"), "[[links\nbroken").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("links.toml"));
    }
}
