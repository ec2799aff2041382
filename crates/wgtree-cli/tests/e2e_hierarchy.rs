//! E2E tests for the `wgt` pre-flight workflow.
//!
//! Each test writes a snapshot into a temp project and runs the binary
//! against it with an explicit auth context in the environment.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// A(1) ─ B(2) ─ C(3) ─ D(4) ─ E(5), plus a second root Ops(10).
const CHAIN: &str = r#"[
    {"id": 1, "name": "A", "depth": 1},
    {"id": 2, "name": "B", "parentId": 1, "depth": 2, "ancestors": [{"id": 1, "name": "A"}]},
    {"id": 3, "name": "C", "parentId": 2, "depth": 3},
    {"id": 4, "name": "D", "parentId": 3, "depth": 4},
    {"id": 5, "name": "E", "parentId": 4, "depth": 5},
    {"id": 10, "name": "Ops", "depth": 1}
]"#;

fn project(snapshot: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let wgtree = dir.path().join(".wgtree");
    std::fs::create_dir_all(&wgtree).expect("create .wgtree");
    std::fs::write(wgtree.join("snapshot.json"), snapshot).expect("write snapshot");
    dir
}

fn wgt_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wgt"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".user-config"));
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd.env("WGTREE_LOG", "error");
    cmd.env("WGTREE_USER", "alice");
    cmd.env("WGTREE_ROLES", "ADMIN");
    cmd
}

fn json_stdout(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn tree_json_lists_preorder() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["tree", "--format", "json"])
        .output()
        .expect("run");
    let rows = json_stdout(&output);
    let ids: Vec<i64> = rows
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 10]);
}

#[test]
fn tree_text_has_header() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["tree", "--root", "3", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tdepth\tparent\tchildren\tname\n3\t3\t2\t1\tC\n"));
}

#[test]
fn show_reports_depth_ceiling() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["show", "5", "--json"])
        .output()
        .expect("run");
    let view = json_stdout(&output);
    assert_eq!(view["workgroup"]["name"], "E");
    assert_eq!(view["breadcrumb"].as_array().expect("crumbs").len(), 4);
    assert_eq!(view["createChild"]["allowed"], false);
    assert_eq!(view["createChild"]["reason"], "maximum depth (5 levels) reached");
}

#[test]
fn show_unknown_id_is_contract_error() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["show", "99", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[E2001]: workgroup 99 is not present in the snapshot",
        ));
}

#[test]
fn parents_excludes_subtree() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["parents", "3", "--json"])
        .output()
        .expect("run");
    let entries = json_stdout(&output);
    let ids: Vec<i64> = entries
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["workgroup"]["id"].as_i64().expect("id"))
        .collect();
    // C has height 2: parents must sit at depth <= 2.
    assert_eq!(ids, vec![1, 10, 2]);
}

#[test]
fn parents_explain_gives_reasons() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["parents", "2", "--explain", "--json"])
        .output()
        .expect("run");
    let entries = json_stdout(&output);
    let e = entries
        .as_array()
        .expect("array")
        .iter()
        .find(|e| e["workgroup"]["id"] == 5)
        .expect("E listed");
    assert_eq!(e["verdict"]["allowed"], false);
    assert_eq!(e["verdict"]["code"], "descendant_parent");
}

// ---------------------------------------------------------------------------
// Pre-flight create
// ---------------------------------------------------------------------------

#[test]
fn create_under_fourth_level_is_ready() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["create", "--parent", "4", "--name", "Leaf", "--json"])
        .output()
        .expect("run");
    let view = json_stdout(&output);
    assert_eq!(view["ok"], true);
    assert_eq!(view["newDepth"], 5);
    assert_eq!(view["request"], serde_json::json!({"name": "Leaf", "parentId": 4}));
}

#[test]
fn create_under_fifth_level_is_denied() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["create", "--parent", "5", "--name", "TooDeep", "--format", "text"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "error[E2004]: maximum depth (5 levels) reached",
        ));
}

#[test]
fn create_root_with_taken_name_is_denied() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["create", "--parent", "none", "--name", "Ops", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "a sibling workgroup named 'Ops' already exists",
        ));
}

#[test]
fn create_reports_field_errors() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["create", "--parent", "1", "--name", " padded", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2005"))
        .stderr(predicate::str::contains(
            "invalid name: must not start or end with whitespace",
        ));
}

#[test]
fn create_requires_admin_role() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .env("WGTREE_ROLES", "USER")
        .args(["create", "--parent", "1", "--name", "X", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[E4001]: user 'alice' lacks the ADMIN role",
        ));
}

#[test]
fn create_without_signed_in_user_fails() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .env_remove("WGTREE_USER")
        .args(["create", "--parent", "1", "--name", "X", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4002"))
        .stderr(predicate::str::contains("WGTREE_USER"));
}

// ---------------------------------------------------------------------------
// Pre-flight move
// ---------------------------------------------------------------------------

#[test]
fn move_under_descendant_is_denied() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["move", "2", "--parent", "5", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error[E2003]: workgroup 5 is a descendant of the workgroup being moved",
        ));
}

#[test]
fn move_subtree_to_root_previews_depths() {
    let dir = project(CHAIN);
    let output = wgt_cmd(dir.path())
        .args(["move", "2", "--parent", "none", "--json"])
        .output()
        .expect("run");
    let view = json_stdout(&output);
    assert_eq!(view["request"], serde_json::json!({"workgroupId": 2, "newParentId": null}));
    let depths: Vec<(i64, i64)> = view["preview"]["changes"]
        .as_array()
        .expect("changes")
        .iter()
        .map(|c| {
            (
                c["oldDepth"].as_i64().expect("old"),
                c["newDepth"].as_i64().expect("new"),
            )
        })
        .collect();
    assert_eq!(depths, vec![(2, 1), (3, 2), (4, 3), (5, 4)]);
}

#[test]
fn move_too_deep_is_denied() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["move", "10", "--parent", "5", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "move would place workgroups at depth 6, exceeding the maximum depth (5 levels)",
        ));
}

// ---------------------------------------------------------------------------
// Snapshot handling
// ---------------------------------------------------------------------------

#[test]
fn stale_snapshot_blocks_preflight_but_not_reads() {
    let stale = r#"{"fetchedAt": "2020-01-01T00:00:00Z", "workgroups": [{"id": 1, "name": "A", "depth": 1}]}"#;
    let dir = project(stale);
    wgt_cmd(dir.path())
        .args(["tree", "--format", "text"])
        .assert()
        .success();
    wgt_cmd(dir.path())
        .args(["create", "--parent", "1", "--name", "X", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1003"));
}

#[test]
fn staleness_check_can_be_disabled() {
    let stale = r#"{"fetchedAt": "2020-01-01T00:00:00Z", "workgroups": [{"id": 1, "name": "A", "depth": 1}]}"#;
    let dir = project(stale);
    std::fs::write(
        dir.path().join(".wgtree/config.toml"),
        "[snapshot]\nmax_age_secs = 0\n",
    )
    .expect("write config");
    wgt_cmd(dir.path())
        .args(["create", "--parent", "1", "--name", "X", "--json"])
        .assert()
        .success();
}

#[test]
fn missing_snapshot_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    wgt_cmd(dir.path())
        .args(["tree", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"));
}

#[test]
fn snapshot_flag_overrides_config() {
    let dir = project(CHAIN);
    std::fs::write(
        dir.path().join("other.json"),
        r#"[{"id": 77, "name": "Elsewhere", "depth": 1}]"#,
    )
    .expect("write");
    wgt_cmd(dir.path())
        .args(["--snapshot", "other.json", "tree", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Elsewhere"));
}

#[test]
fn configured_max_depth_applies() {
    let dir = project(CHAIN);
    std::fs::write(
        dir.path().join(".wgtree/config.toml"),
        "[hierarchy]\nmax_depth = 3\n",
    )
    .expect("write config");
    wgt_cmd(dir.path())
        .args(["create", "--parent", "3", "--name", "X", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum depth (3 levels) reached"));
}

// ---------------------------------------------------------------------------
// verify / completions
// ---------------------------------------------------------------------------

#[test]
fn verify_clean_snapshot() {
    let dir = project(CHAIN);
    wgt_cmd(dir.path())
        .args(["verify", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   6 workgroups checked"));
}

#[test]
fn verify_reports_violations() {
    let broken = r#"[
        {"id": 1, "name": "A", "depth": 1},
        {"id": 2, "name": "Dup", "parentId": 1, "depth": 2},
        {"id": 3, "name": "Dup", "parentId": 1, "depth": 3},
        {"id": 4, "name": "Lost", "parentId": 40, "depth": 2}
    ]"#;
    let dir = project(broken);
    wgt_cmd(dir.path())
        .args(["verify", "--format", "text"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "FAIL workgroup 3 records depth 3 but its parent implies 2",
        ))
        .stdout(predicate::str::contains(
            "FAIL workgroup 4 references parent 40, which is not in the snapshot",
        ))
        .stdout(predicate::str::contains(
            "FAIL name 'Dup' is used by siblings 2, 3 under workgroup 1",
        ))
        .stderr(predicate::str::contains("E3001"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let dir = project(r#"[{"id": 1, "name": "A", "depth": 1}, {"id": 1, "name": "B", "depth": 1}]"#);
    wgt_cmd(dir.path())
        .args(["tree", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"));
}

#[test]
fn completions_generate_without_snapshot() {
    let dir = TempDir::new().expect("tempdir");
    wgt_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wgt"));
}
