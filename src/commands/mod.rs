//! Subcommand orchestration: wire declarations, backends, and the logger
//! to the engine and translate results into exit codes.

pub mod backup;
pub mod check;
pub mod diff;
pub mod tweak;

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Logger;
use crate::platform::Platform;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, root resolution, and declaration
/// loading so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected host platform.
    pub platform: Platform,
    /// Resolved configuration root.
    pub root: PathBuf,
    /// Loaded declaration files.
    pub config: Config,
}

impl CommandSetup {
    /// Detect the platform, resolve the configuration root, and load all
    /// declaration files.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined or any
    /// declaration file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;

        log.stage("Loading declarations");
        let config = Config::load(&root)?;
        log.debug(&format!("{} link declarations", config.links.len()));
        log.debug(&format!("{} tweak declarations", config.tweaks.len()));

        Ok(Self {
            platform,
            root,
            config,
        })
    }
}

/// Resolve the configuration root from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if the root directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var("DRIFTWATCH_ROOT") {
        return Ok(PathBuf::from(root));
    }

    // Last resort: current directory, if it holds declaration files.
    let cwd = std::env::current_dir()?;
    if cwd.join("links.toml").exists() || cwd.join("tweaks.toml").exists() {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine configuration root. Use --root or set DRIFTWATCH_ROOT")
}
