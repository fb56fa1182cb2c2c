//! Error types for quill-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from config, state-store, and lock operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (config save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config parse error on load — includes file path for context.
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Schedule state JSON error (load/save path).
    #[error("schedule state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `dirs` could not resolve a platform directory.
    #[error("cannot determine {kind} directory; set $HOME or equivalent")]
    DirNotFound { kind: &'static str },

    /// No config file has been written yet.
    #[error("no config found at {path}; run `quill init` first")]
    ConfigNotFound { path: PathBuf },

    /// Another reconciliation run holds the advisory lock.
    #[error("another quill run is already in progress (lock at {path})")]
    AlreadyRunning { path: PathBuf },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
