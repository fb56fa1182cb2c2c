//! Safe pruning of clones that left the tracked set.
//!
//! A clone is deleted only when it is provably safe: clean worktree and no
//! commits the remote lacks. Any doubt — dirty tree, unpushed work, or a
//! failed classification — leaves the directory in place, reported as
//! lingering. Directories still in the expected set are never touched.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use quill_git::{detect_default_branch, has_unpushed_commits, is_worktree_clean, repo_exists};

/// Outcome of one prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Clones removed (clean, nothing unpushed).
    pub removed: Vec<PathBuf>,
    /// Clones retained because deletion could lose work.
    pub lingering: Vec<PathBuf>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.lingering.is_empty()
    }
}

/// Remove managed clones under `base_dir` whose folder is not in `expected`.
///
/// Only directories carrying a version-control marker are considered; plain
/// files and unrelated directories are ignored. The scan itself is
/// best-effort: an unreadable base directory yields an empty report.
pub fn prune_unexpected(base_dir: &Path, expected: &BTreeSet<String>) -> PruneReport {
    let mut report = PruneReport::default();
    let Ok(entries) = std::fs::read_dir(base_dir) else {
        return report;
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| repo_exists(path))
        .filter(|path| {
            path.file_name()
                .map(|n| !expected.contains(&n.to_string_lossy().into_owned()))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    for path in candidates {
        if safe_to_delete(&path) {
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    tracing::info!("pruned {}", path.display());
                    report.removed.push(path);
                }
                Err(err) => {
                    tracing::warn!("failed to remove {}: {err}", path.display());
                    report.lingering.push(path);
                }
            }
        } else {
            tracing::info!("lingering (not safe to delete): {}", path.display());
            report.lingering.push(path);
        }
    }
    report
}

/// Deletion is allowed iff the worktree is clean AND the branch is provably
/// not ahead of the remote. Absence of proof of safety is proof of danger.
fn safe_to_delete(repo: &Path) -> bool {
    let branch = detect_default_branch(repo);
    let clean = match is_worktree_clean(repo) {
        Ok(clean) => clean,
        Err(err) => {
            tracing::warn!("classification failed for {}: {err}", repo.display());
            return false;
        }
    };
    let ahead = has_unpushed_commits(repo, &branch);
    clean && ahead == Some(false)
}
