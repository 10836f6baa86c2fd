//! Registry tweak classification, apply, and revert.
//!
//! A tweak bundles one or more registry entry declarations with an optional
//! default to restore on revert. Classification is a pure, total function of
//! (current, declared, default); apply is idempotent and dry-run aware;
//! revert is gated on the tweak's reversibility flag. All mutating loops
//! catch failures at the entry boundary and keep going — one broken entry
//! never abandons the rest of the batch.

use serde::Deserialize;

use crate::registry::{RegistryOps, RegistryValue, values_equal};

/// One declared registry value with its revert default.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    /// Key path, `HIVE\sub\key` spelling.
    pub key: String,
    /// Value name under the key.
    pub name: String,
    /// Declared (desired) value; `Absent` means the value must not exist.
    pub value: RegistryValue,
    /// Value restored on revert; `Absent` means delete on revert.
    #[serde(default = "absent")]
    pub default: RegistryValue,
}

fn absent() -> RegistryValue {
    RegistryValue::Absent
}

/// A named bundle of registry entry declarations.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweak {
    /// Stable identifier used on the command line.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Whether revert is permitted for this tweak.
    #[serde(default)]
    pub reversible: bool,
    /// Entry declarations, applied and reported in order.
    pub entries: Vec<RegistryEntry>,
}

/// Derived status of one registry entry. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStatus {
    /// Current value equals the declared value.
    Applied,
    /// Current value equals the default (or the value is missing while the
    /// declaration expects one).
    NotApplied,
    /// Current value is absent alongside an absent default.
    Reverted,
    /// Current value matches neither declaration nor default.
    Drifted,
    /// The current value could not be read.
    Error,
}

/// Tweak-level aggregate of entry matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweakStatus {
    /// Every entry matches its declared value.
    Applied,
    /// No entry matches its declared value.
    NotApplied,
    /// Some, but not all, entries match.
    Partial,
}

/// Per-entry observation produced by [`Reconciler::detect`].
#[derive(Debug, Clone)]
pub struct EntryProbe {
    /// The declaration this probe belongs to.
    pub entry: RegistryEntry,
    /// Observed value; `None` when the read failed.
    pub observed: Option<RegistryValue>,
    /// Derived status.
    pub status: RegistryStatus,
    /// Whether the observed value equals the declared value.
    pub matches_declared: bool,
}

/// Detection result for a whole tweak.
#[derive(Debug, Clone)]
pub struct TweakDetection {
    /// Aggregate over all entries.
    pub status: TweakStatus,
    /// Per-entry observations, in declaration order.
    pub entries: Vec<EntryProbe>,
}

/// Severity of one operation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeLevel {
    /// The entry was handled (written, deleted, already correct, or dry-run).
    Ok,
    /// The entry failed; the rest of the batch still ran.
    Error,
}

/// Result record for one entry of an apply/revert call.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    /// Key path of the entry.
    pub key: String,
    /// Value name of the entry.
    pub name: String,
    /// Severity.
    pub level: OutcomeLevel,
    /// Human-readable message.
    pub message: String,
}

/// Overall result of one apply/revert call. Produced fresh per call.
#[derive(Debug, Clone)]
pub struct OperationReport {
    /// `Error` when any entry outcome is `Error`.
    pub level: OutcomeLevel,
    /// Ordered per-entry outcomes.
    pub entries: Vec<EntryOutcome>,
}

impl OperationReport {
    fn from_entries(entries: Vec<EntryOutcome>) -> Self {
        let level = if entries.iter().any(|e| e.level == OutcomeLevel::Error) {
            OutcomeLevel::Error
        } else {
            OutcomeLevel::Ok
        };
        Self { level, entries }
    }
}

/// Derive the status of one entry from its observed, declared, and default
/// values. Deterministic and side-effect-free.
///
/// Branch order is load-bearing. The two trailing absence branches are
/// shadowed by the leading equality check (absent equals absent directly)
/// and are preserved to keep the decision table explicit.
#[must_use]
pub fn classify(
    current: &RegistryValue,
    declared: &RegistryValue,
    default: &RegistryValue,
) -> RegistryStatus {
    if values_equal(current, declared) {
        RegistryStatus::Applied
    } else if !default.is_absent() && values_equal(current, default) {
        RegistryStatus::NotApplied
    } else if declared.is_absent() && current.is_absent() {
        RegistryStatus::Applied
    } else if !declared.is_absent() && current.is_absent() {
        RegistryStatus::NotApplied
    } else if default.is_absent() && current.is_absent() {
        RegistryStatus::Reverted
    } else {
        RegistryStatus::Drifted
    }
}

/// Classifies, applies, and reverts registry-backed tweaks over an injected
/// registry capability.
#[derive(Debug)]
pub struct Reconciler<'a> {
    registry: &'a dyn RegistryOps,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over the given registry capability.
    #[must_use]
    pub const fn new(registry: &'a dyn RegistryOps) -> Self {
        Self { registry }
    }

    /// Read and classify one entry. A read failure yields an `Error` probe
    /// with no observed value; it never unwinds the caller's batch.
    #[must_use]
    pub fn classify_entry(&self, entry: &RegistryEntry) -> EntryProbe {
        match self.registry.get_value(&entry.key, &entry.name) {
            Ok(current) => {
                let matches = values_equal(&current, &entry.value);
                let status = classify(&current, &entry.value, &entry.default);
                EntryProbe {
                    entry: entry.clone(),
                    observed: Some(current),
                    status,
                    matches_declared: matches,
                }
            }
            Err(_) => EntryProbe {
                entry: entry.clone(),
                observed: None,
                status: RegistryStatus::Error,
                matches_declared: false,
            },
        }
    }

    /// Classify every entry of a tweak and aggregate the matches.
    #[must_use]
    pub fn detect(&self, tweak: &Tweak) -> TweakDetection {
        let entries: Vec<EntryProbe> =
            tweak.entries.iter().map(|e| self.classify_entry(e)).collect();
        let matching = entries.iter().filter(|p| p.matches_declared).count();
        let status = if matching == entries.len() {
            TweakStatus::Applied
        } else if matching == 0 {
            TweakStatus::NotApplied
        } else {
            TweakStatus::Partial
        };
        TweakDetection { status, entries }
    }

    /// Apply a tweak, entry by entry, in declaration order.
    ///
    /// Entries whose current value already equals the declaration are
    /// skipped (idempotent no-op). A declared `Absent` is applied by
    /// deletion. With `dry_run`, intended actions are reported and nothing
    /// is touched. Failures are captured per entry.
    #[must_use]
    pub fn apply(&self, tweak: &Tweak, dry_run: bool) -> OperationReport {
        let mut outcomes = Vec::with_capacity(tweak.entries.len());
        for entry in &tweak.entries {
            outcomes.push(self.apply_entry(entry, dry_run));
        }
        OperationReport::from_entries(outcomes)
    }

    fn apply_entry(&self, entry: &RegistryEntry, dry_run: bool) -> EntryOutcome {
        let location = format!("{}\\{}", entry.key, entry.name);
        if dry_run {
            let message = if entry.value.is_absent() {
                format!("would delete {location}")
            } else {
                format!("would set {location} to {}", entry.value)
            };
            return ok_outcome(entry, message);
        }

        let current = match self.registry.get_value(&entry.key, &entry.name) {
            Ok(v) => v,
            Err(e) => return error_outcome(entry, format!("read failed: {e}")),
        };
        if values_equal(&current, &entry.value) {
            return ok_outcome(entry, format!("{location} already set"));
        }
        if entry.value.is_absent() {
            return match self.registry.delete_value(&entry.key, &entry.name) {
                Ok(()) => ok_outcome(entry, format!("deleted {location}")),
                Err(e) => error_outcome(entry, format!("delete failed: {e}")),
            };
        }
        match self.registry.set_value(&entry.key, &entry.name, &entry.value) {
            Ok(()) => ok_outcome(entry, format!("set {location} to {}", entry.value)),
            Err(e) => error_outcome(entry, format!("write failed: {e}")),
        }
    }

    /// Revert a tweak to its defaults.
    ///
    /// A non-reversible tweak yields a single `Error`-level synthetic
    /// outcome and performs no mutation. Otherwise each entry's default is
    /// restored unconditionally (no current-value check, unlike apply);
    /// entries without a default are deleted.
    #[must_use]
    pub fn revert(&self, tweak: &Tweak, dry_run: bool) -> OperationReport {
        if !tweak.reversible {
            return OperationReport {
                level: OutcomeLevel::Error,
                entries: vec![EntryOutcome {
                    key: tweak.id.clone(),
                    name: String::new(),
                    level: OutcomeLevel::Error,
                    message: format!("tweak '{}' is not reversible", tweak.id),
                }],
            };
        }
        let mut outcomes = Vec::with_capacity(tweak.entries.len());
        for entry in &tweak.entries {
            outcomes.push(self.revert_entry(entry, dry_run));
        }
        OperationReport::from_entries(outcomes)
    }

    fn revert_entry(&self, entry: &RegistryEntry, dry_run: bool) -> EntryOutcome {
        let location = format!("{}\\{}", entry.key, entry.name);
        if entry.default.is_absent() {
            if dry_run {
                return ok_outcome(entry, format!("would delete {location}"));
            }
            return match self.registry.delete_value(&entry.key, &entry.name) {
                Ok(()) => ok_outcome(entry, format!("deleted {location}")),
                Err(e) => error_outcome(entry, format!("delete failed: {e}")),
            };
        }
        if dry_run {
            return ok_outcome(
                entry,
                format!("would restore {location} to {}", entry.default),
            );
        }
        match self
            .registry
            .set_value(&entry.key, &entry.name, &entry.default)
        {
            Ok(()) => ok_outcome(entry, format!("restored {location} to {}", entry.default)),
            Err(e) => error_outcome(entry, format!("restore failed: {e}")),
        }
    }
}

fn ok_outcome(entry: &RegistryEntry, message: String) -> EntryOutcome {
    EntryOutcome {
        key: entry.key.clone(),
        name: entry.name.clone(),
        level: OutcomeLevel::Ok,
        message,
    }
}

fn error_outcome(entry: &RegistryEntry, message: String) -> EntryOutcome {
    EntryOutcome {
        key: entry.key.clone(),
        name: entry.name.clone(),
        level: OutcomeLevel::Error,
        message,
    }
}
