use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

/// A project directory with one theme of pages and isolated config.
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    let pages = dir.path().join("themes/demo/pages");
    fs::create_dir_all(&pages).unwrap();
    fs::write(
        pages.join("about.htm"),
        "title = \"About\"\n==\n<p>We grow tomatoes.</p>\n",
    )
    .unwrap();
    fs::write(
        pages.join("tomatoes.htm"),
        "title = \"Tomatoes\"\n==\n<p>Tomatoes need sun.</p>\n",
    )
    .unwrap();
    fs::write(pages.join("contact.htm"), "title = \"Contact\"\n==\n<p>Call us.</p>\n").unwrap();
    dir
}

fn cms(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cms-search").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("SEARCH_THEMES_ROOT", dir.join("themes"))
        .env("SEARCH_THEME", "demo")
        .env("SEARCH_INDEX_PATH", dir.join("storage"))
        .env_remove("SEARCH_ENGINE")
        .env_remove("SEARCH_PREFIX")
        .env_remove("SEARCH_QUEUE")
        .env_remove("CMS_SEARCH_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn robot_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("cms-search").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("cms-search").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_tokenize_human() {
    let dir = tempdir().unwrap();
    cms(dir.path())
        .args(["tokenize", "The Quick-Brown Fox runs."])
        .assert()
        .success()
        .stdout(predicate::str::contains("quick\nbrown\nfox\nrun\n"))
        .stdout(predicate::str::contains("quick% %brown% %fox% %run"));
}

#[test]
fn test_tokenize_simple_json() {
    let dir = tempdir().unwrap();
    let json = robot_json(cms(dir.path()).args(["--robot", "tokenize", "--simple", "The fox runs"]));
    assert_eq!(json["mode"], "simple");
    assert_eq!(json["terms"], serde_json::json!(["the", "fox", "runs"]));
}

#[test]
fn test_search_ranked_robot() {
    let dir = project();
    let json = robot_json(cms(dir.path()).args(["--robot", "search", "tomatoes", "--ranked"]));

    assert_eq!(json["status"], "ok");
    assert_eq!(json["index"], "demo-pages");
    assert_eq!(json["driver"], "database");
    assert_eq!(json["count"], 2);
    assert_eq!(json["results"][0]["fileName"], "tomatoes.htm");
    assert_eq!(json["results"][0]["key"], "tomatoes-htm");
    assert_eq!(json["results"][1]["fileName"], "about.htm");
    assert!(json["results"][0]["relevance"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_search_first_on_collection_driver() {
    let dir = project();
    let json = robot_json(cms(dir.path()).args([
        "--robot", "search", "tomatoes", "--first", "--driver", "collection",
    ]));
    assert_eq!(json["driver"], "collection");
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["fileName"], "tomatoes.htm");
}

#[test]
fn test_search_null_driver_finds_nothing() {
    let dir = project();
    let json = robot_json(cms(dir.path()).args(["--robot", "search", "tomatoes", "--driver", "null"]));
    assert_eq!(json["count"], 0);
}

#[test]
fn test_search_fuzzy_stop_words_only() {
    let dir = project();
    let json = robot_json(cms(dir.path()).args(["--robot", "search", "the and of", "--fuzzy"]));
    assert_eq!(json["status"], "no_query");
    assert_eq!(json["count"], 0);
}

#[test]
fn test_search_human_output() {
    let dir = project();
    cms(dir.path())
        .args(["search", "sun"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tomatoes"))
        .stdout(predicate::str::contains("tomatoes.htm"));
}

#[test]
fn test_index_then_flush() {
    let dir = project();
    let store = dir.path().join("storage/demo-pages.sqlite");

    let json = robot_json(cms(dir.path()).args(["--robot", "index"]));
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rebuilt"], true);
    assert_eq!(json["rows"], 3);
    assert_eq!(json["sync"]["status"], "synced");
    assert!(store.exists());

    let json = robot_json(cms(dir.path()).args(["--robot", "index", "--force"]));
    assert_eq!(json["rebuilt"], true);

    let json = robot_json(cms(dir.path()).args(["--robot", "flush"]));
    assert_eq!(json["flushed"], true);
    assert!(!store.exists());
}

#[test]
fn test_index_reports_queue() {
    let dir = project();
    let json = robot_json(cms(dir.path()).env("SEARCH_QUEUE", "true").args(["--robot", "index"]));
    assert_eq!(json["sync"]["status"], "queued");
    assert_eq!(json["sync"]["records"], 3);
}

#[test]
fn test_project_config_file_is_read() {
    let dir = project();
    fs::write(
        dir.path().join("search.toml"),
        "[search]\ndriver = \"collection\"\nprefix = \"site_\"\n",
    )
    .unwrap();
    let json = robot_json(cms(dir.path()).args(["--robot", "search", "contact"]));
    assert_eq!(json["driver"], "collection");
    assert_eq!(json["index"], "site_demo-pages");
    assert_eq!(json["count"], 1);
}

#[test]
fn test_create_index_unsupported_on_database() {
    let dir = project();
    let output = cms(dir.path())
        .args(["--robot", "create-index", "posts", "--key", "id"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["details"]["code"], "ENGINE_UNSUPPORTED");
}

#[test]
fn test_delete_index_on_null_engine() {
    let dir = project();
    let json = robot_json(cms(dir.path()).args(["--robot", "delete-index", "posts", "--driver", "null"]));
    assert_eq!(json["status"], "ok");
    assert_eq!(json["action"], "deleted");
}

#[test]
fn test_unknown_driver_error() {
    let dir = project();
    cms(dir.path())
        .args(["search", "x", "--driver", "sphinx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
