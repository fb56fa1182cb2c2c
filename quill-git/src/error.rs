//! Error types for quill-git.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from git operations.
///
/// Output excerpts carried here are already credential-redacted by the
/// calling operation.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git clone` exited non-zero. Carries the last line of tool output.
    #[error("git clone failed: {output}")]
    CloneFailed { output: String },

    /// `git pull` exited non-zero (conflict, divergence, or transport error).
    #[error("git pull failed: {output}")]
    PullFailed { output: String },

    /// Remote add/set-url exited non-zero.
    #[error("git remote configuration failed: {output}")]
    RemoteConfigFailed { output: String },

    /// The git binary itself could not be spawned.
    #[error("failed to run git in {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worktree status query exited non-zero.
    #[error("git status failed: {output}")]
    StatusFailed { output: String },
}
