//! Safe-pruner guarantees: deletion only with proof of safety.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use quill_git::{ensure_clone, ensure_remote};
use quill_sync::prune::prune_unexpected;

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

fn make_upstream(dir: &Path) {
    std::fs::create_dir_all(dir).expect("mkdir");
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    std::fs::write(dir.join("main.tex"), "content\n").expect("write");
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "initial"]);
}

fn make_clone(base: &Path, upstream: &Path, folder: &str) -> PathBuf {
    let url = upstream.to_string_lossy().to_string();
    let repo = ensure_clone(base, folder, &url, None).expect("clone");
    ensure_remote(&repo, &url, None).expect("remote");
    repo
}

fn expected(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn clean_unexpected_clone_is_removed() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream);
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "departed");

    let report = prune_unexpected(&base, &expected(&[]));
    assert_eq!(report.removed, vec![repo.clone()]);
    assert!(report.lingering.is_empty());
    assert!(!repo.exists());
}

#[test]
fn expected_clones_are_never_touched() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream);
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "tracked");
    // Even content that would otherwise qualify for deletion is off-limits
    // while the folder is in the expected set.
    let report = prune_unexpected(&base, &expected(&["tracked"]));
    assert!(report.is_empty());
    assert!(repo.exists());
}

#[test]
fn non_repo_entries_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("mirrors");
    std::fs::create_dir_all(base.join("plain-directory")).unwrap();
    std::fs::write(base.join("stray-file.txt"), "not a repo\n").unwrap();

    let report = prune_unexpected(&base, &expected(&[]));
    assert!(report.is_empty());
    assert!(base.join("plain-directory").exists());
    assert!(base.join("stray-file.txt").exists());
}

#[test]
fn dirty_worktree_lingers() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream);
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "dirty");
    std::fs::write(repo.join("uncommitted.tex"), "work in progress\n").unwrap();

    let report = prune_unexpected(&base, &expected(&[]));
    assert!(report.removed.is_empty());
    assert_eq!(report.lingering, vec![repo.clone()]);
    assert!(repo.join("uncommitted.tex").exists());
}

#[test]
fn unpushed_commits_linger() {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    let base = tmp.path().join("mirrors");
    make_upstream(&upstream);
    std::fs::create_dir_all(&base).unwrap();
    let repo = make_clone(&base, &upstream, "ahead");
    std::fs::write(repo.join("local.tex"), "never pushed\n").unwrap();
    git(&repo, &["add", "-A"]);
    git(&repo, &["commit", "-m", "local work"]);

    let report = prune_unexpected(&base, &expected(&[]));
    assert!(report.removed.is_empty());
    assert_eq!(report.lingering, vec![repo.clone()]);
    assert!(repo.exists());
}

#[test]
fn classification_failure_lingers() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("mirrors");
    std::fs::create_dir_all(&base).unwrap();
    // Looks like a managed clone (has a .git marker) but git cannot read it:
    // absence of proof of safety is proof of danger.
    let broken = base.join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join(".git"), "gitdir: /nonexistent\n").unwrap();

    let report = prune_unexpected(&base, &expected(&[]));
    assert!(report.removed.is_empty());
    assert_eq!(report.lingering, vec![broken.clone()]);
    assert!(broken.exists());
}
