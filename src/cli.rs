//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the drift detection engine.
#[derive(Parser, Debug)]
#[command(
    name = "driftwatch",
    about = "State reconciliation and change tracking for declared machine configuration",
    version
)]
pub struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the configuration root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check declared symlinks for drift
    Check,
    /// Inspect or reconcile declared registry tweaks
    Tweak {
        /// What to do with the declared tweaks.
        #[command(subcommand)]
        action: TweakAction,
    },
    /// Create, list, or restore timestamped file backups
    Backup {
        /// What to do with the snapshot store.
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Capture and compare content-hash snapshots of a directory tree
    Diff {
        /// What to do with the diff baseline.
        #[command(subcommand)]
        action: DiffAction,
    },
    /// Print version information
    Version,
}

/// Actions on registry tweaks.
#[derive(Subcommand, Debug)]
pub enum TweakAction {
    /// Report whether each declared tweak is applied
    Status,
    /// Apply declared tweaks
    Apply(TweakSelectOpts),
    /// Revert declared tweaks to their defaults
    Revert(TweakSelectOpts),
}

/// Tweak selection for apply and revert.
#[derive(Parser, Debug, Clone)]
pub struct TweakSelectOpts {
    /// Act on a single tweak by id instead of all declared tweaks
    #[arg(long)]
    pub id: Option<String>,
}

/// Actions on backup snapshots.
#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Snapshot the given paths (defaults to all declared link targets)
    Create {
        /// Paths to back up
        paths: Vec<std::path::PathBuf>,
    },
    /// List stored snapshots, newest first
    List,
    /// Restore files from a snapshot
    Restore {
        /// Snapshot id, e.g. 2026-08-30_12-00-00
        id: String,

        /// Restore only the entry with this file name
        #[arg(long)]
        filter: Option<String>,
    },
}

/// Actions on tree-diff sessions.
#[derive(Subcommand, Debug)]
pub enum DiffAction {
    /// Capture a baseline of a directory tree
    Capture {
        /// Directory to fingerprint
        path: std::path::PathBuf,
    },
    /// Compare the tree against the captured baseline
    Compare {
        /// Keep the baseline for further comparisons instead of consuming it
        #[arg(long)]
        keep: bool,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["driftwatch", "check"]);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn parse_check_verbose() {
        let cli = Cli::parse_from(["driftwatch", "-v", "check"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["driftwatch", "--root", "/tmp/conf", "check"]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/tmp/conf"))
        );
    }

    #[test]
    fn parse_tweak_status() {
        let cli = Cli::parse_from(["driftwatch", "tweak", "status"]);
        assert!(matches!(
            cli.command,
            Command::Tweak {
                action: TweakAction::Status
            }
        ));
    }

    #[test]
    fn parse_tweak_apply_dry_run() {
        let cli = Cli::parse_from(["driftwatch", "--dry-run", "tweak", "apply"]);
        assert!(cli.global.dry_run);
        assert!(matches!(
            cli.command,
            Command::Tweak {
                action: TweakAction::Apply(_)
            }
        ));
    }

    #[test]
    fn parse_tweak_revert_single_id() {
        let cli = Cli::parse_from(["driftwatch", "tweak", "revert", "--id", "hide-search-box"]);
        let Command::Tweak {
            action: TweakAction::Revert(opts),
        } = cli.command
        else {
            panic!("expected tweak revert");
        };
        assert_eq!(opts.id.as_deref(), Some("hide-search-box"));
    }

    #[test]
    fn parse_backup_create_with_paths() {
        let cli = Cli::parse_from(["driftwatch", "backup", "create", "/etc/hosts", "/tmp/x"]);
        let Command::Backup {
            action: BackupAction::Create { paths },
        } = cli.command
        else {
            panic!("expected backup create");
        };
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn parse_backup_restore_with_filter() {
        let cli = Cli::parse_from([
            "driftwatch",
            "backup",
            "restore",
            "2026-08-30_12-00-00",
            "--filter",
            "hosts",
        ]);
        let Command::Backup {
            action: BackupAction::Restore { id, filter },
        } = cli.command
        else {
            panic!("expected backup restore");
        };
        assert_eq!(id, "2026-08-30_12-00-00");
        assert_eq!(filter.as_deref(), Some("hosts"));
    }

    #[test]
    fn parse_diff_capture() {
        let cli = Cli::parse_from(["driftwatch", "diff", "capture", "/etc"]);
        assert!(matches!(
            cli.command,
            Command::Diff {
                action: DiffAction::Capture { .. }
            }
        ));
    }

    #[test]
    fn parse_diff_compare_keep() {
        let cli = Cli::parse_from(["driftwatch", "diff", "compare", "--keep"]);
        let Command::Diff {
            action: DiffAction::Compare { keep },
        } = cli.command
        else {
            panic!("expected diff compare");
        };
        assert!(keep);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["driftwatch", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
