//! End-to-end check and fix runs over small on-disk corpora.
//!
//! Each test writes a throwaway repository, runs the same entry points the
//! binary uses, and inspects both the report and the files left behind.

use aidd_core::prelude::*;
use aidd_core::SilentObserver;
use aidd_test_utils::{pending_requirement_yaml, plan_goal_yaml, CorpusFixture};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn docs() -> Vec<PathBuf> {
    vec![PathBuf::from("docs")]
}

fn check(fixture: &CorpusFixture) -> TraceabilityReport {
    run_check(&fixture.layer(), &docs()).expect("corpus should load")
}

struct NoOperator;

impl OperatorInput for NoOperator {
    fn ask(
        &mut self,
        _entry: &aidd_trace::PlaceholderEntry,
        _candidates: &[aidd_artifact::Identifier],
    ) -> Option<String> {
        panic!("automatic sessions never ask");
    }
}

/// A resolved upstream link passes; the downstream item is an orphan.
#[test]
fn scenario_a_resolved_link() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", "id: PLN-PLN-GOAL-001\n")
        .with_file(
            "docs/B.yaml",
            "id: REQ-REQ-ITEM-001\nderived_from: PLN-PLN-GOAL-001\n",
        );
    let report = check(&fixture);

    assert!(report.overall_pass);
    assert_eq!(report.summary.ids_found, 2);
    assert_eq!(report.summary.references_found, 1);
    assert_eq!(report.summary.broken_links, 0);
    assert_eq!(report.summary.pending_derived_from, 0);
    let orphans: Vec<_> = report.orphan_ids.iter().map(|id| id.as_str()).collect();
    assert_eq!(orphans, ["REQ-REQ-ITEM-001"]);
    assert_eq!(report.status(), ExitStatus::Pass);
}

/// A pending upstream field is a placeholder and fails the check.
#[test]
fn scenario_b_pending_placeholder() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file("docs/B.yaml", pending_requirement_yaml());
    let report = check(&fixture);

    assert!(!report.overall_pass);
    assert_eq!(report.pending_derived_from.len(), 1);
    let entry = &report.pending_derived_from[0];
    assert_eq!(
        (entry.file.as_str(), entry.context_str(), entry.field.as_str()),
        ("docs/B.yaml", "REQ-REQ-ITEM-001", "derived_from")
    );
    assert_eq!(report.status(), ExitStatus::Fail);
}

/// A reference to an undeclared identifier is a broken link.
#[test]
fn scenario_c_broken_link() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file(
            "docs/B.yaml",
            "id: REQ-REQ-ITEM-001\nderived_from: PLN-PLN-GOAL-999\n",
        );
    let report = check(&fixture);

    assert!(!report.overall_pass);
    assert_eq!(report.broken_links.len(), 1);
    assert_eq!(report.broken_links[0].reference.target.as_str(), "PLN-PLN-GOAL-999");
    assert_eq!(report.broken_links[0].reference.source_file, "docs/B.yaml");
}

/// Fixing scenario B automatically rewrites only the pending field, after
/// which the corpus passes.
#[test]
fn scenario_d_automatic_fix_then_pass() {
    let original = "\
id: REQ-REQ-ITEM-001
title: Login form
derived_from: PENDING
priority: 2
estimate: 1.5
acceptance:
  owner: qa
  steps:
    - open form
    - submit
versions:
  1: first
  2: second
flags:
  true: on
kind: !custom widget
";
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file("docs/B.yaml", original);
    let mut expected: serde_yaml::Value = serde_yaml::from_str(original).expect("valid fixture");
    expected["derived_from"] = serde_yaml::Value::from("PLN-PLN-GOAL-001");

    let layer = fixture.layer();
    let mut session = FixSession::prepare(
        &layer,
        &TraceConfig::default(),
        &docs(),
        &[PathBuf::from("docs/B.yaml")],
        FixMode::automatic("PLN-PLN-GOAL-001").expect("valid identifier"),
        WriteMode::Persist,
    )
    .expect("session prepares");
    let summary = session.run(&mut NoOperator, &mut SilentObserver);

    assert_eq!(summary.fixed, 1);
    let written: serde_yaml::Value =
        serde_yaml::from_str(&fixture.read("docs/B.yaml")).expect("written file parses");
    assert_eq!(written, expected);
    assert!(check(&fixture).overall_pass);
}

/// An all-pending list is one placeholder, not one per element.
#[test]
fn scenario_e_all_pending_list() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file(
            "docs/B.yaml",
            "id: REQ-REQ-ITEM-001\nderived_from: [\"PENDING\", \"PENDING\"]\n",
        );
    let report = check(&fixture);
    assert_eq!(report.summary.pending_derived_from, 1);
}

/// Two checks over an unchanged corpus agree on everything but the timestamp.
#[test]
fn check_is_idempotent() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file("docs/B.yaml", pending_requirement_yaml())
        .with_file(
            "docs/C.json",
            r#"{"id": "DES-DES-MOD-001", "derived_from": "REQ-REQ-ITEM-001", "traces_to": ["TST-TST-CASE-001"]}"#,
        );
    let first = check(&fixture).with_generated_at("fixed");
    let second = check(&fixture).with_generated_at("fixed");
    assert_eq!(first, second);
}

/// A patched document, re-read, extracts exactly the new reference in place
/// of the placeholder; JSON documents take the same path as YAML ones.
#[test]
fn patch_round_trip_json_and_nested() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file(
            "docs/B.json",
            r#"{
  "doc_id": "REQ-REQ-DOC-001",
  "items": [
    {"id": "REQ-REQ-ITEM-001", "related": {"derivedfrom": "PENDING"}},
    {"id": "REQ-REQ-ITEM-002", "derived_from": "PLN-PLN-GOAL-001"}
  ]
}
"#,
        );
    let before = check(&fixture);
    assert_eq!(before.summary.pending_derived_from, 1);
    assert_eq!(before.summary.references_found, 1);

    let layer = fixture.layer();
    let mut session = FixSession::prepare(
        &layer,
        &TraceConfig::default(),
        &docs(),
        &docs(),
        FixMode::automatic("PLN-PLN-GOAL-001").expect("valid identifier"),
        WriteMode::Persist,
    )
    .expect("session prepares");
    assert_eq!(session.run(&mut NoOperator, &mut SilentObserver).fixed, 1);

    let after = check(&fixture);
    assert!(after.overall_pass);
    assert_eq!(after.summary.references_found, 2);
    let patched = after
        .references
        .iter()
        .find(|r| r.source_id_str() == "REQ-REQ-ITEM-001")
        .expect("patched reference");
    assert_eq!(patched.field, "derivedfrom");
    assert_eq!(patched.target.as_str(), "PLN-PLN-GOAL-001");
    assert!(fixture.read("docs/B.json").starts_with("{\n  \"doc_id\""));
}

/// Dry runs report the same fixes and leave the disk alone.
#[test]
fn dry_run_leaves_files_untouched() {
    let fixture = CorpusFixture::new()
        .with_file("docs/A.yaml", plan_goal_yaml())
        .with_file("docs/B.yaml", pending_requirement_yaml());
    let layer = fixture.layer();
    let mut session = FixSession::prepare(
        &layer,
        &TraceConfig::default(),
        &docs(),
        &docs(),
        FixMode::automatic("PLN-PLN-GOAL-001").expect("valid identifier"),
        WriteMode::DryRun,
    )
    .expect("session prepares");
    let summary = session.run(&mut NoOperator, &mut SilentObserver);

    assert_eq!(summary.fixed, 1);
    assert_eq!(fixture.read("docs/B.yaml"), pending_requirement_yaml());
    assert!(!check(&fixture).overall_pass);
}
