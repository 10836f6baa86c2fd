//! The `tweak` command: registry tweak status, apply, and revert.

use anyhow::Result;

use crate::cli::{GlobalOpts, TweakAction, TweakSelectOpts};
use crate::logging::Logger;
use crate::reconcile::tweaks::{
    OperationReport, OutcomeLevel, Reconciler, Tweak, TweakStatus,
};
use crate::registry::RegistryOps;

/// Run the `tweak` command against the native registry backend.
///
/// # Errors
///
/// Returns an error if declarations fail to load, the platform has no
/// registry, a selected tweak id does not exist, or any mutation fails.
pub fn run(global: &GlobalOpts, action: &TweakAction, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;

    if setup.config.tweaks.is_empty() {
        log.info("no tweaks declared");
        return Ok(());
    }

    let registry = native_registry()?;
    let reconciler = Reconciler::new(registry.as_ref());
    match action {
        TweakAction::Status => status(&reconciler, &setup.config.tweaks, log),
        TweakAction::Apply(opts) => {
            mutate(&reconciler, &setup.config.tweaks, opts, global.dry_run, log, Mode::Apply)
        }
        TweakAction::Revert(opts) => {
            mutate(&reconciler, &setup.config.tweaks, opts, global.dry_run, log, Mode::Revert)
        }
    }
}

#[cfg(windows)]
fn native_registry() -> Result<Box<dyn RegistryOps>> {
    Ok(Box::new(crate::registry::windows::WindowsRegistry::new()))
}

#[cfg(not(windows))]
fn native_registry() -> Result<Box<dyn RegistryOps>> {
    anyhow::bail!("registry tweaks require a Windows registry")
}

/// Report the detection status of every declared tweak.
fn status(reconciler: &Reconciler<'_>, tweaks: &[Tweak], log: &Logger) -> Result<()> {
    log.stage("Tweak status");
    let mut applied = 0usize;
    for tweak in tweaks {
        let detection = reconciler.detect(tweak);
        let label = match detection.status {
            TweakStatus::Applied => {
                applied += 1;
                "applied"
            }
            TweakStatus::NotApplied => "not applied",
            TweakStatus::Partial => "partial",
        };
        log.info(&format!("{}: {label} ({})", tweak.id, tweak.label));
        for probe in &detection.entries {
            log.debug(&format!(
                "  {}\\{}: declared {}, observed {}",
                probe.entry.key,
                probe.entry.name,
                probe.entry.value,
                probe
                    .observed
                    .as_ref()
                    .map_or_else(|| "<unreadable>".to_string(), ToString::to_string)
            ));
        }
    }
    log.info(&format!("{applied} of {} tweak(s) applied", tweaks.len()));
    Ok(())
}

#[derive(Clone, Copy)]
enum Mode {
    Apply,
    Revert,
}

/// Apply or revert the selected tweaks and surface per-entry outcomes.
fn mutate(
    reconciler: &Reconciler<'_>,
    tweaks: &[Tweak],
    opts: &TweakSelectOpts,
    dry_run: bool,
    log: &Logger,
    mode: Mode,
) -> Result<()> {
    let selected: Vec<&Tweak> = match opts.id.as_deref() {
        Some(id) => {
            let Some(tweak) = tweaks.iter().find(|t| t.id == id) else {
                anyhow::bail!("no declared tweak with id '{id}'");
            };
            vec![tweak]
        }
        None => tweaks.iter().collect(),
    };

    log.stage(match mode {
        Mode::Apply => "Applying tweaks",
        Mode::Revert => "Reverting tweaks",
    });

    let mut failures = 0u32;
    for tweak in selected {
        let report = match mode {
            Mode::Apply => reconciler.apply(tweak, dry_run),
            Mode::Revert => reconciler.revert(tweak, dry_run),
        };
        if report.level == OutcomeLevel::Error {
            failures += 1;
        }
        print_report(&tweak.id, &report, dry_run, log);
    }

    if failures > 0 {
        anyhow::bail!("{failures} tweak(s) failed");
    }
    Ok(())
}

fn print_report(id: &str, report: &OperationReport, dry_run: bool, log: &Logger) {
    for outcome in &report.entries {
        let line = format!("{id}: {}\\{}: {}", outcome.key, outcome.name, outcome.message);
        match outcome.level {
            OutcomeLevel::Ok if dry_run => log.dry_run(&line),
            OutcomeLevel::Ok => log.info(&line),
            OutcomeLevel::Error => log.error(&line),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::reconcile::tweaks::RegistryEntry;
    use crate::registry::RegistryValue;
    use crate::registry::test_helpers::InMemoryRegistry;

    fn declared() -> Vec<Tweak> {
        vec![Tweak {
            id: "flag".to_string(),
            label: "Example flag".to_string(),
            reversible: true,
            entries: vec![RegistryEntry {
                key: r"HKCU\Software\Example".to_string(),
                name: "Flag".to_string(),
                value: RegistryValue::Dword(1),
                default: RegistryValue::Dword(0),
            }],
        }]
    }

    #[test]
    fn mutate_unknown_id_is_an_error() {
        let registry = InMemoryRegistry::new();
        let reconciler = Reconciler::new(&registry);
        let opts = TweakSelectOpts {
            id: Some("missing".to_string()),
        };
        let err = mutate(
            &reconciler,
            &declared(),
            &opts,
            false,
            &Logger::new(false),
            Mode::Apply,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn mutate_applies_selected_tweak() {
        let registry = InMemoryRegistry::new();
        let reconciler = Reconciler::new(&registry);
        let opts = TweakSelectOpts {
            id: Some("flag".to_string()),
        };
        mutate(
            &reconciler,
            &declared(),
            &opts,
            false,
            &Logger::new(false),
            Mode::Apply,
        )
        .unwrap();
        assert_eq!(
            registry.raw_get(r"HKCU\Software\Example", "Flag"),
            RegistryValue::Dword(1)
        );
    }

    #[test]
    fn mutate_dry_run_touches_nothing() {
        let registry = InMemoryRegistry::new();
        let reconciler = Reconciler::new(&registry);
        let opts = TweakSelectOpts { id: None };
        mutate(
            &reconciler,
            &declared(),
            &opts,
            true,
            &Logger::new(false),
            Mode::Apply,
        )
        .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn mutate_reports_write_failures() {
        let registry = InMemoryRegistry::new().with_failing_writes();
        let reconciler = Reconciler::new(&registry);
        let opts = TweakSelectOpts { id: None };
        let err = mutate(
            &reconciler,
            &declared(),
            &opts,
            false,
            &Logger::new(false),
            Mode::Apply,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[test]
    fn status_reports_all_tweaks() {
        let registry = InMemoryRegistry::new().with_value(
            r"HKCU\Software\Example",
            "Flag",
            RegistryValue::Dword(1),
        );
        let reconciler = Reconciler::new(&registry);
        status(&reconciler, &declared(), &Logger::new(false)).unwrap();
    }
}
