//! Drift classification and reconciliation for declared resources.
//!
//! Two resource kinds are reconciled against declarations: filesystem
//! symlinks ([`links`]) and registry-backed tweaks ([`tweaks`]). Both follow
//! the same contract: classification is read-only and total, mutation is
//! idempotent where the current state already matches, and batch loops
//! report per-item outcomes instead of unwinding on the first failure.

pub mod links;
pub mod tweaks;
