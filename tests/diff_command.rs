#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `diff` command path — baseline capture and
//! comparison across separate engine instances.

mod common;

use driftwatch::cancel::CancelToken;
use driftwatch::diff::{ChangeKind, TreeDiff};
use driftwatch::error::EngineError;

/// The canonical watch scenario: capture, mutate the tree three ways,
/// compare once, and the baseline is consumed.
#[test]
fn capture_mutate_compare_consumes_baseline() {
    let ctx = common::IntegrationTestContext::new();
    let tree = ctx.root_path().join("watched");
    std::fs::create_dir_all(tree.join("nested")).unwrap();
    std::fs::write(tree.join("a.txt"), "alpha").unwrap();
    std::fs::write(tree.join("nested/b.txt"), "beta").unwrap();

    let engine = TreeDiff::new(ctx.root_path().join("slot.json"));
    let session = engine.capture(&tree, &CancelToken::new()).unwrap();

    std::fs::write(tree.join("a.txt"), "alpha-2").unwrap();
    std::fs::remove_file(tree.join("nested/b.txt")).unwrap();
    std::fs::write(tree.join("c.txt"), "gamma").unwrap();

    let changes = session.finish(&CancelToken::new()).unwrap();
    let kinds: Vec<(&str, ChangeKind)> = changes
        .iter()
        .map(|c| (c.relative_path.as_str(), c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("a.txt", ChangeKind::Modified),
            ("c.txt", ChangeKind::Added),
            ("nested/b.txt", ChangeKind::Deleted),
        ]
    );

    // The one-shot session is gone; a second compare must fail.
    assert!(!engine.has_snapshot());
    let err = engine.resume().unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

/// A baseline captured by one process is visible to a fresh engine over
/// the same slot file.
#[test]
fn baseline_survives_across_engine_instances() {
    let ctx = common::IntegrationTestContext::new();
    let tree = ctx.root_path().join("watched");
    std::fs::create_dir_all(&tree).unwrap();
    std::fs::write(tree.join("a.txt"), "alpha").unwrap();

    let slot = ctx.root_path().join("slot.json");
    {
        let engine = TreeDiff::new(slot.clone());
        let _ = engine.capture(&tree, &CancelToken::new()).unwrap();
    }

    std::fs::write(tree.join("b.txt"), "beta").unwrap();

    let engine = TreeDiff::new(slot);
    let changes = engine
        .resume()
        .unwrap()
        .finish(&CancelToken::new())
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].relative_path, "b.txt");
    assert_eq!(changes[0].kind, ChangeKind::Added);
}

/// Comparing with `changes` keeps the baseline so drift accumulates
/// against the original capture, not the previous comparison.
#[test]
fn repeated_comparison_uses_the_original_baseline() {
    let ctx = common::IntegrationTestContext::new();
    let tree = ctx.root_path().join("watched");
    std::fs::create_dir_all(&tree).unwrap();
    std::fs::write(tree.join("a.txt"), "v1").unwrap();

    let engine = TreeDiff::new(ctx.root_path().join("slot.json"));
    let session = engine.capture(&tree, &CancelToken::new()).unwrap();

    std::fs::write(tree.join("a.txt"), "v2").unwrap();
    assert_eq!(session.changes(&CancelToken::new()).unwrap().len(), 1);

    // Reverting the edit brings the tree back to the baseline.
    std::fs::write(tree.join("a.txt"), "v1").unwrap();
    assert!(session.changes(&CancelToken::new()).unwrap().is_empty());
    assert!(engine.has_snapshot());
}

/// Timestamp-only churn is invisible: identical bytes hash identically.
#[test]
fn rewriting_identical_content_is_not_drift() {
    let ctx = common::IntegrationTestContext::new();
    let tree = ctx.root_path().join("watched");
    std::fs::create_dir_all(&tree).unwrap();
    std::fs::write(tree.join("a.txt"), "stable").unwrap();

    let engine = TreeDiff::new(ctx.root_path().join("slot.json"));
    let session = engine.capture(&tree, &CancelToken::new()).unwrap();

    std::fs::write(tree.join("a.txt"), "stable").unwrap();
    assert!(session.finish(&CancelToken::new()).unwrap().is_empty());
}
