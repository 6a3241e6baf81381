#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{TestEnv, fixture_path};
use predicates::prelude::*;

#[test]
fn add_list_remove() {
    let env = TestEnv::new();

    env.cmd()
        .args(["add", "geo"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Added geo (70 fragments"));

    let listed = env.json(&["list", "--format", "json"]);
    let entries = listed.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["alias"], "geo");
    assert_eq!(entries[0]["fragments"], 70);
    assert_eq!(entries[0]["binding"], "documenterSearchIndex");

    env.cmd()
        .args(["remove", "geo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed geo"));

    let listed = env.json(&["list", "--format", "json"]);
    assert_eq!(listed, serde_json::json!([]));
}

#[test]
fn add_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();
    env.add_fixture("geo");

    env.cmd()
        .args(["add", "geo"])
        .arg(fixture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.cmd()
        .args(["add", "geo", "--force"])
        .arg(fixture_path())
        .assert()
        .success();
}

#[test]
fn add_rejects_unsafe_alias() {
    let env = TestEnv::new();
    env.cmd()
        .args(["add", "../escape"])
        .arg(fixture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid alias"));
}

#[test]
fn add_rejects_malformed_file_unless_lenient() {
    let env = TestEnv::new();
    let file = env.write_file(
        "broken.js",
        concat!(
            "var documenterSearchIndex = {\"docs\":\n[",
            "{\"location\":\"\",\"page\":\"Home\",\"title\":\"Home\",\"text\":\"hi\",\"category\":\"page\"},",
            "{\"location\":\"x/\",\"page\":\"X\",\"title\":\"X\",\"text\":\"\",\"category\":\"module\"}",
            "]\n}\n"
        ),
    );

    env.cmd()
        .args(["add", "broken"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid record #1"));

    env.cmd()
        .args(["add", "broken", "--lenient"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 malformed records skipped"));

    let listed = env.json(&["list", "--format", "json"]);
    assert_eq!(listed[0]["fragments"], 1);
}

#[test]
fn remove_unknown_source_fails() {
    let env = TestEnv::new();
    env.cmd()
        .args(["remove", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
