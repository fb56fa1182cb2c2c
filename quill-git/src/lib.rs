//! # quill-git
//!
//! Subprocess git layer for the quill mirror scheduler: idempotent clone,
//! managed-remote upsert, fast-forward-only pull, fetch-free head comparison,
//! and the safety checks the pruner relies on. All output that could carry a
//! credential is redacted before it reaches logs or errors.

pub mod error;
pub mod repo;
pub mod url;

pub use error::GitError;
pub use repo::{
    detect_default_branch, ensure_clone, ensure_remote, has_unpushed_commits, is_worktree_clean,
    local_branch_head, pull, remote_branch_head, repo_exists, REMOTE_NAME,
};
pub use url::{redact, remote_url, REDACTED};
