//! E2E workflow tests: import a flat plan, inspect it, edit it, export it.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn plg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("plg"));
    cmd.current_dir(dir);
    cmd.env("PLANGRAPH_LOG", "error");
    cmd.env("FORMAT", "json");
    cmd
}

fn plg_text_cmd(dir: &Path) -> Command {
    let mut cmd = plg_cmd(dir);
    cmd.env("FORMAT", "text");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = plg_cmd(dir).args(args).output().expect("plg should not crash");
    assert!(
        output.status.success(),
        "plg {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

/// Essay plan: research → outline → draft → revise, with a reading step
/// that feeds the draft.
fn write_flat_plan(dir: &Path) -> PathBuf {
    let plan = json!({
        "id": "essay",
        "title": "History essay",
        "version": 3,
        "steps": [
            { "id": "research", "title": "Find sources", "step_type": "research",
              "sort_index": 0, "estimated_duration": 3600 },
            { "id": "read", "title": "Read chapter 4", "step_type": "reading",
              "sort_index": 1, "estimated_duration": 1800 },
            { "id": "outline", "title": "Outline", "step_type": "writing",
              "sort_index": 2, "estimated_duration": 1200,
              "prerequisite_ids": ["research"] },
            { "id": "draft", "title": "First draft", "step_type": "writing",
              "sort_index": 3, "estimated_duration": 7200,
              "prerequisite_ids": ["outline", "read"] },
            { "id": "revise", "title": "Revise", "step_type": "review",
              "sort_index": 4, "estimated_duration": 2400,
              "prerequisite_ids": ["draft"] }
        ]
    });
    let path = dir.join("flat.json");
    fs::write(&path, serde_json::to_string_pretty(&plan).expect("serialize")).expect("write");
    path
}

fn import(dir: &Path) -> PathBuf {
    write_flat_plan(dir);
    let report = run_json(dir, &["import", "flat.json", "-o", "plan.json"]);
    assert_eq!(report["nodes"], 5);
    assert_eq!(report["edges"], 4);
    dir.join("plan.json")
}

fn ids(values: &Value) -> Vec<String> {
    values
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v["id"].as_str().expect("id").to_string())
        .collect()
}

#[test]
fn import_then_validate_is_clean() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let report = run_json(dir.path(), &["validate", "plan.json"]);
    assert_eq!(report["valid"], true);
    assert_eq!(report["violations"].as_array().unwrap().len(), 0);

    plg_text_cmd(dir.path())
        .args(["validate", "plan.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok  nodes=5  edges=4"));
}

#[test]
fn order_respects_prerequisites_and_sort_index() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let order = run_json(dir.path(), &["order", "plan.json"]);
    assert_eq!(
        ids(&order["steps"]),
        vec!["research", "read", "outline", "draft", "revise"]
    );
}

#[test]
fn layers_group_parallel_steps() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let layers = run_json(dir.path(), &["layers", "plan.json"]);
    let layers = layers["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 4);
    assert_eq!(ids(&layers[0]["steps"]), vec!["research", "read"]);
    assert_eq!(ids(&layers[3]["steps"]), vec!["revise"]);
}

#[test]
fn next_lists_only_unblocked_steps() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let next = run_json(dir.path(), &["next", "plan.json"]);
    assert_eq!(ids(&next["available"]), vec!["research", "read"]);

    let limited = run_json(dir.path(), &["next", "plan.json", "-n", "1"]);
    assert_eq!(ids(&limited["available"]), vec!["research"]);
}

#[test]
fn done_unblocks_dependents_and_persists() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let done = run_json(
        dir.path(),
        &["done", "plan.json", "research", "--at", "2025-03-01T09:00:00Z"],
    );
    assert_eq!(done["changed"], true);
    assert_eq!(done["unblocked"], json!(["outline"]));

    let next = run_json(dir.path(), &["next", "plan.json"]);
    assert_eq!(ids(&next["available"]), vec!["read", "outline"]);

    // Completing twice is a no-op.
    let again = run_json(dir.path(), &["done", "plan.json", "research"]);
    assert_eq!(again["changed"], false);
    assert_eq!(again["version"], done["version"]);

    let reopened = run_json(dir.path(), &["reopen", "plan.json", "research"]);
    assert_eq!(reopened["changed"], true);
    let next = run_json(dir.path(), &["next", "plan.json"]);
    assert_eq!(ids(&next["available"]), vec!["research", "read"]);
}

#[test]
fn done_unknown_step_fails_with_error_code() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let output = plg_cmd(dir.path())
        .args(["done", "plan.json", "ghost"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::Deserializer::from_slice(&output.stderr)
        .into_iter::<Value>()
        .next()
        .expect("JSON error on stderr")
        .expect("valid JSON");
    assert_eq!(err["error"]["error_code"], "invalid_node_reference");
}

#[test]
fn stats_report_critical_path() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    let stats = run_json(dir.path(), &["stats", "plan.json"]);
    assert_eq!(stats["statistics"]["total_nodes"], 5);
    assert_eq!(stats["statistics"]["longest_path"], 3);
    assert_eq!(stats["statistics"]["root_node_count"], 2);
}

#[test]
fn show_lists_prerequisites_and_dependents() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    plg_text_cmd(dir.path())
        .args(["show", "plan.json", "draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("outline"))
        .stdout(predicate::str::contains("revise"));

    plg_cmd(dir.path())
        .args(["show", "plan.json", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid_node_reference"));
}

#[test]
fn dot_marks_soft_edges_dashed() {
    let dir = TempDir::new().unwrap();
    import(dir.path());
    run_json(
        dir.path(),
        &["link", "plan.json", "read", "outline", "--soft", "--reason", "context"],
    );

    plg_text_cmd(dir.path())
        .args(["dot", "plan.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph"))
        .stdout(predicate::str::contains("dashed"));

    let dot = run_json(dir.path(), &["dot", "plan.json"]);
    assert!(dot["content_hash"].as_str().unwrap().starts_with("blake3:"));
}

#[test]
fn export_writes_state_back_onto_flat_plan() {
    let dir = TempDir::new().unwrap();
    import(dir.path());
    run_json(
        dir.path(),
        &["done", "plan.json", "research", "--at", "2025-03-01T09:00:00Z"],
    );
    run_json(dir.path(), &["unlink", "plan.json", "read", "draft"]);

    let report = run_json(
        dir.path(),
        &["export", "plan.json", "--onto", "flat.json", "-o", "out.json"],
    );
    assert_eq!(report["updated_steps"], 2);

    let flat: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    let steps = flat["steps"].as_array().unwrap();
    assert_eq!(steps[0]["is_completed"], true);
    assert_eq!(steps[3]["prerequisite_ids"], json!(["outline"]));
    assert_eq!(flat["version"], report["version"]);

    // --onto is untouched when -o is given.
    let original: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("flat.json")).unwrap()).unwrap();
    assert_eq!(original["version"], 3);
}

#[test]
fn quiet_suppresses_confirmation_lines() {
    let dir = TempDir::new().unwrap();
    import(dir.path());

    plg_text_cmd(dir.path())
        .args(["done", "plan.json", "research"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("✓ research done"));

    for args in [
        &["-q", "reopen", "plan.json", "research"][..],
        &["--quiet", "link", "plan.json", "read", "outline"][..],
        &["-q", "unlink", "plan.json", "read", "outline"][..],
    ] {
        plg_text_cmd(dir.path())
            .args(args)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    // JSON payloads are data, not confirmation, and stay on stdout.
    let done = run_json(dir.path(), &["-q", "done", "plan.json", "read"]);
    assert_eq!(done["changed"], true);
}
