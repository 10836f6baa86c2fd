//! The `check` command: symlink drift reporting.

use anyhow::Result;

use crate::cancel::CancelToken;
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::operations::SystemFileSystemOps;
use crate::reconcile::links::{LinkStatus, check_links};

/// Run the `check` command: classify every declared link and report drift.
///
/// # Errors
///
/// Returns an error if declarations fail to load, the run is cancelled, or
/// any link is not in the declared state.
pub fn run(global: &GlobalOpts, log: &Logger, cancel: &CancelToken) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;

    log.stage("Checking declared links");
    if setup.config.links.is_empty() {
        log.info("no links declared");
        return Ok(());
    }

    let fs = SystemFileSystemOps;
    let mut drifted = 0u32;
    let any_drift = check_links(&setup.config.links, &fs, cancel, |report| {
        let line = format!(
            "[{}] {}: {}",
            report.module,
            report.target.display(),
            report.message
        );
        match report.status {
            LinkStatus::Ok => log.debug(&line),
            LinkStatus::Missing | LinkStatus::Drift => {
                drifted += 1;
                log.warn(&line);
            }
            LinkStatus::Error => {
                drifted += 1;
                log.error(&line);
            }
        }
    })?;

    if any_drift {
        anyhow::bail!(
            "{drifted} of {} link(s) not in declared state",
            setup.config.links.len()
        );
    }
    log.info(&format!(
        "all {} link(s) match their declarations",
        setup.config.links.len()
    ));
    Ok(())
}
