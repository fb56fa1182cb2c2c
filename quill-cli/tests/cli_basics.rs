//! CLI integration tests: config lifecycle and error surfaces.
//!
//! Every invocation points `HOME` at a temp dir so nothing touches the real
//! user environment; none of these tests reach the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use quill_core::config;

fn quill(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quill").expect("binary");
    cmd.env("HOME", home.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    quill(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("run-once"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("set-token"));
}

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let base = home.path().join("papers");

    quill(&home)
        .args(["init", "--base-dir"])
        .arg(&base)
        .args(["--count", "5", "--interval", "12h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved config to"));

    let cfg = config::load_at(home.path()).expect("load config");
    assert_eq!(cfg.base_dir, base);
    assert_eq!(cfg.project_count, 5);
    assert_eq!(cfg.runner_interval.to_string(), "12h");
    assert!(cfg.full_sync_on_ac);
    assert!(base.exists());

    quill(&home)
        .args(["init", "--base-dir"])
        .arg(&base)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    quill(&home)
        .args(["init", "--force", "--no-full-sync-on-ac", "--base-dir"])
        .arg(&base)
        .assert()
        .success();
    let cfg = config::load_at(home.path()).expect("reload config");
    assert!(!cfg.full_sync_on_ac);
}

#[test]
fn set_token_stores_credential() {
    let home = TempDir::new().unwrap();
    quill(&home)
        .args(["init", "--base-dir"])
        .arg(home.path().join("papers"))
        .assert()
        .success();

    quill(&home)
        .args(["set-token", "olp_abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Git token saved"));

    let cfg = config::load_at(home.path()).expect("load config");
    assert_eq!(cfg.git_token.as_deref(), Some("olp_abc123"));
}

#[test]
fn set_token_without_config_fails_with_hint() {
    let home = TempDir::new().unwrap();
    quill(&home)
        .args(["set-token", "olp_abc123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quill init"));
}

#[test]
fn sync_without_token_names_the_remediation() {
    let home = TempDir::new().unwrap();
    quill(&home)
        .args(["init", "--base-dir"])
        .arg(home.path().join("papers"))
        .assert()
        .success();

    quill(&home)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Git token is required"));
}

#[test]
fn run_once_without_token_names_the_remediation() {
    let home = TempDir::new().unwrap();
    quill(&home)
        .args(["init", "--base-dir"])
        .arg(home.path().join("papers"))
        .assert()
        .success();

    quill(&home)
        .arg("run-once")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Git token is required"));
}
