//! Git subprocess operations.
//!
//! Everything here shells out to the `git` binary with captured output; no
//! operation is interactive. Head queries (`ls-remote`, `rev-parse`) never
//! fail loudly — they return `Option` and the caller treats `None` as
//! "possibly changed". Mutating operations (`clone`, `pull`, remote upsert)
//! return typed errors carrying a redacted tail of the tool output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::GitError;
use crate::url::redact;

/// Name of the remote quill manages inside each clone. Other remotes are
/// never touched.
pub const REMOTE_NAME: &str = "quill";

fn run_git(cwd: &Path, args: &[&str]) -> Result<Output, GitError> {
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| GitError::Spawn {
            path: cwd.to_path_buf(),
            source,
        })
}

/// Last non-empty line of a command's stderr (falling back to stdout),
/// credential-redacted. Used for error payloads.
fn output_tail(output: &Output, credential: Option<&str>) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stderr
        .lines()
        .rev()
        .chain(stdout.lines().rev())
        .find(|l| !l.trim().is_empty())
        .unwrap_or("(no output)")
        .trim()
        .to_owned();
    redact(&line, credential)
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// A directory is a managed clone when it carries a `.git` marker.
pub fn repo_exists(path: &Path) -> bool {
    path.join(".git").exists()
}

// ---------------------------------------------------------------------------
// Clone / remote / pull
// ---------------------------------------------------------------------------

/// Ensure a clone of `remote_url` exists at `<base_dir>/<folder>`.
///
/// Idempotent: if a clone is already present the call is a no-op and returns
/// the same path. The credential is only used to redact announcements and
/// error output; it is already embedded in `remote_url` by the caller.
pub fn ensure_clone(
    base_dir: &Path,
    folder: &str,
    remote_url: &str,
    credential: Option<&str>,
) -> Result<PathBuf, GitError> {
    let path = base_dir.join(folder);
    if repo_exists(&path) {
        return Ok(path);
    }

    tracing::info!(
        "git clone {} {}",
        redact(remote_url, credential),
        path.display()
    );
    let output = run_git(base_dir, &["clone", remote_url, &path.to_string_lossy()])?;
    if !output.status.success() {
        return Err(GitError::CloneFailed {
            output: output_tail(&output, credential),
        });
    }
    Ok(path)
}

/// Idempotent upsert of the managed remote to `remote_url`.
///
/// Adds the remote if absent; rewrites its URL if it has drifted (rotated
/// credential, changed host). Other remotes are left alone.
pub fn ensure_remote(
    repo: &Path,
    remote_url: &str,
    credential: Option<&str>,
) -> Result<(), GitError> {
    let current = run_git(repo, &["remote", "get-url", REMOTE_NAME])?;
    if !current.status.success() {
        tracing::debug!(
            "git remote add {REMOTE_NAME} {}",
            redact(remote_url, credential)
        );
        let output = run_git(repo, &["remote", "add", REMOTE_NAME, remote_url])?;
        if !output.status.success() {
            return Err(GitError::RemoteConfigFailed {
                output: output_tail(&output, credential),
            });
        }
        return Ok(());
    }

    if stdout_trimmed(&current) != remote_url {
        tracing::debug!(
            "git remote set-url {REMOTE_NAME} {}",
            redact(remote_url, credential)
        );
        let output = run_git(repo, &["remote", "set-url", REMOTE_NAME, remote_url])?;
        if !output.status.success() {
            return Err(GitError::RemoteConfigFailed {
                output: output_tail(&output, credential),
            });
        }
    }
    Ok(())
}

/// Fetch + fast-forward-only merge of the managed remote's `branch`.
///
/// Conflicts, non-fast-forward divergence, and transport failures all
/// surface as [`GitError::PullFailed`]. Retry is the scheduler's job, not
/// this function's.
pub fn pull(repo: &Path, branch: &str, credential: Option<&str>) -> Result<(), GitError> {
    tracing::info!("git pull --ff-only {REMOTE_NAME} {branch} in {}", repo.display());
    let output = run_git(repo, &["pull", "--ff-only", REMOTE_NAME, branch])?;
    if !output.status.success() {
        return Err(GitError::PullFailed {
            output: output_tail(&output, credential),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Head comparison
// ---------------------------------------------------------------------------

/// Preferred branch for a clone: `master` if the remote has it, else `main`,
/// else whatever the local checkout is on, else literal `master`.
///
/// The ordering is a fixed tie-break, not configurable.
pub fn detect_default_branch(repo: &Path) -> String {
    if let Ok(output) = run_git(repo, &["ls-remote", "--heads", REMOTE_NAME]) {
        if output.status.success() {
            let heads = String::from_utf8_lossy(&output.stdout);
            for candidate in ["master", "main"] {
                let suffix = format!("refs/heads/{candidate}");
                if heads.lines().any(|l| l.ends_with(&suffix)) {
                    return candidate.to_owned();
                }
            }
        }
    }

    if let Ok(output) = run_git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]) {
        if output.status.success() {
            let local = stdout_trimmed(&output);
            if !local.is_empty() && local != "HEAD" {
                return local;
            }
        }
    }
    "master".to_owned()
}

/// Commit id at the tip of `branch` on the managed remote, without fetching
/// object data. `None` on any resolution failure — callers must assume
/// "possibly changed".
pub fn remote_branch_head(repo: &Path, branch: &str) -> Option<String> {
    let refspec = format!("refs/heads/{branch}");
    let output = run_git(repo, &["ls-remote", REMOTE_NAME, &refspec]).ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let sha = stdout.lines().next()?.split_whitespace().next()?.to_owned();
    if sha.is_empty() {
        None
    } else {
        Some(sha)
    }
}

/// Commit id at the tip of the local `branch`. `None` when the branch does
/// not exist or the repository is unreadable.
pub fn local_branch_head(repo: &Path, branch: &str) -> Option<String> {
    let refspec = format!("refs/heads/{branch}");
    let output = run_git(repo, &["rev-parse", "--verify", &refspec]).ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = stdout_trimmed(&output);
    if sha.is_empty() {
        None
    } else {
        Some(sha)
    }
}

// ---------------------------------------------------------------------------
// Safety classification
// ---------------------------------------------------------------------------

/// True when the worktree has no uncommitted changes (untracked files count
/// as changes).
pub fn is_worktree_clean(repo: &Path) -> Result<bool, GitError> {
    let output = run_git(repo, &["status", "--porcelain"])?;
    if !output.status.success() {
        return Err(GitError::StatusFailed {
            output: output_tail(&output, None),
        });
    }
    Ok(stdout_trimmed(&output).is_empty())
}

/// Whether the local `branch` holds commits the remote does not have.
///
/// `None` means undeterminable (remote branch missing, remote head not known
/// locally, or the query failed) — callers must treat that as unsafe.
pub fn has_unpushed_commits(repo: &Path, branch: &str) -> Option<bool> {
    let remote_sha = remote_branch_head(repo, branch)?;
    let exclude = format!("^{remote_sha}");
    let output = run_git(repo, &["rev-list", "--count", branch, &exclude]).ok()?;
    if !output.status.success() {
        return None;
    }
    let count: u64 = stdout_trimmed(&output).parse().ok()?;
    Some(count > 0)
}
