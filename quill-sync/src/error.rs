//! Error types for quill-sync.

use thiserror::Error;

use quill_core::CoreError;
use quill_git::GitError;

/// All errors that can abort a reconciliation run.
///
/// Undeterminable heads are deliberately *not* represented here — they fold
/// into the "changed" decision (and into status reasons), never into errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Pre-flight TCP probe failed for at least one required host.
    ///
    /// Recoverable: an automatic run reschedules and skips; a manual run
    /// aborts with this error and leaves schedule state untouched.
    #[error("no internet connectivity to {web_host}/{git_host}; aborted full sync")]
    Connectivity { web_host: String, git_host: String },

    /// No git credential configured. Fatal before any partial work.
    #[error("Git token is required. Run 'quill set-token' and retry.")]
    MissingCredential,

    /// A clone/pull/remote operation failed; aborts the remaining projects.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Config, state-store, or lock failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The project source could not deliver the tracked project list.
    #[error("project listing failed: {message}")]
    ProjectSource { message: String },
}
