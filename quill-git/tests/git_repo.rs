//! End-to-end tests for the git layer against real local repositories.
//!
//! Upstreams are plain directories used as path remotes, so nothing here
//! touches the network.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use quill_git::{
    detect_default_branch, ensure_clone, ensure_remote, has_unpushed_commits, is_worktree_clean,
    local_branch_head, pull, remote_branch_head, repo_exists, GitError, REDACTED,
};

fn git(cwd: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(["-c", "user.name=quill-test", "-c", "user.email=quill@test"])
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

/// Create an upstream repo on `branch` with one committed file.
fn make_upstream(dir: &Path, branch: &str) {
    std::fs::create_dir_all(dir).expect("mkdir");
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);
    std::fs::write(dir.join("main.tex"), "\\documentclass{article}\n").expect("write");
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "initial"]);
}

fn commit_change(dir: &Path, file: &str, content: &str) {
    std::fs::write(dir.join(file), content).expect("write");
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "change"]);
}

/// Clone an upstream and point the managed remote at it.
fn make_clone(base: &Path, upstream: &Path, folder: &str) -> PathBuf {
    let url = upstream.to_string_lossy().to_string();
    let repo = ensure_clone(base, folder, &url, None).expect("clone");
    ensure_remote(&repo, &url, None).expect("remote");
    repo
}

#[test]
fn ensure_clone_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();

    let url = upstream.to_string_lossy().to_string();
    let first = ensure_clone(&base, "thesis-64f0c3a1", &url, None).expect("clone");
    assert!(repo_exists(&first));
    assert!(first.join("main.tex").exists());

    // Second call must not re-clone: local-only state survives.
    std::fs::write(first.join("scratch.txt"), "local note").unwrap();
    let second = ensure_clone(&base, "thesis-64f0c3a1", &url, None).expect("noop");
    assert_eq!(first, second);
    assert!(second.join("scratch.txt").exists());
}

#[test]
fn ensure_remote_adds_then_updates_drifted_url() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    let get_url = |remote: &str| -> String {
        let output = Command::new("git")
            .args(["remote", "get-url", remote])
            .current_dir(&repo)
            .output()
            .expect("git");
        String::from_utf8_lossy(&output.stdout).trim().to_owned()
    };
    assert_eq!(get_url("quill"), upstream.to_string_lossy());

    // Credential rotation: same project, new URL.
    let rotated = format!("{}/", upstream.to_string_lossy());
    ensure_remote(&repo, &rotated, None).expect("set-url");
    assert_eq!(get_url("quill"), rotated);

    // The clone's original remote is not disturbed.
    assert_eq!(get_url("origin"), upstream.to_string_lossy());
}

#[test]
fn branch_detection_prefers_master_then_main_then_local() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("mirrors");
    std::fs::create_dir_all(&base).unwrap();

    let master_up = tmp.path().join("up-master");
    make_upstream(&master_up, "master");
    let repo = make_clone(&base, &master_up, "on-master");
    assert_eq!(detect_default_branch(&repo), "master");

    let main_up = tmp.path().join("up-main");
    make_upstream(&main_up, "main");
    let repo = make_clone(&base, &main_up, "on-main");
    assert_eq!(detect_default_branch(&repo), "main");

    let trunk_up = tmp.path().join("up-trunk");
    make_upstream(&trunk_up, "trunk");
    let repo = make_clone(&base, &trunk_up, "on-trunk");
    // Remote has neither master nor main; falls back to the local checkout.
    assert_eq!(detect_default_branch(&repo), "trunk");
}

#[test]
fn heads_match_after_clone_and_pull_catches_up() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    let remote = remote_branch_head(&repo, "master").expect("remote head");
    let local = local_branch_head(&repo, "master").expect("local head");
    assert_eq!(remote, local);

    commit_change(&upstream, "section.tex", "\\section{New}\n");
    let remote = remote_branch_head(&repo, "master").expect("remote head");
    let local = local_branch_head(&repo, "master").expect("local head");
    assert_ne!(remote, local);

    pull(&repo, "master", None).expect("pull");
    let local = local_branch_head(&repo, "master").expect("local head");
    assert_eq!(remote, local);
}

#[test]
fn heads_are_none_for_missing_branch() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    assert_eq!(remote_branch_head(&repo, "no-such-branch"), None);
    assert_eq!(local_branch_head(&repo, "no-such-branch"), None);
}

#[test]
fn pull_refuses_non_fast_forward() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    commit_change(&upstream, "a.tex", "upstream side\n");
    commit_change(&repo, "b.tex", "local side\n");

    let err = pull(&repo, "master", None).unwrap_err();
    match err {
        GitError::PullFailed { output } => assert!(!output.is_empty()),
        other => panic!("expected PullFailed, got {other:?}"),
    }
}

#[test]
fn worktree_clean_then_dirty() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    assert!(is_worktree_clean(&repo).expect("status"));
    std::fs::write(repo.join("draft.tex"), "wip\n").unwrap();
    assert!(!is_worktree_clean(&repo).expect("status"));
}

#[test]
fn unpushed_commit_detection() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream, "master");
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "p");

    assert_eq!(has_unpushed_commits(&repo, "master"), Some(false));
    commit_change(&repo, "local.tex", "never pushed\n");
    assert_eq!(has_unpushed_commits(&repo, "master"), Some(true));
    // Undeterminable when the remote branch does not exist.
    assert_eq!(has_unpushed_commits(&repo, "no-such-branch"), None);
}

#[test]
fn clone_failure_carries_redacted_tail() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("mirrors");
    std::fs::create_dir_all(&base).unwrap();

    // The secret appears in the URL; the error must not echo it.
    let url = format!("{}/missing-s3cr3t-upstream", tmp.path().display());
    let err = ensure_clone(&base, "gone", &url, Some("s3cr3t")).unwrap_err();
    match err {
        GitError::CloneFailed { output } => {
            assert!(!output.is_empty());
            assert!(!output.contains("s3cr3t"), "credential leaked: {output}");
            if output.contains("missing-") {
                assert!(output.contains(REDACTED));
            }
        }
        other => panic!("expected CloneFailed, got {other:?}"),
    }
}
