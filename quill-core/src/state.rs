//! Schedule state store.
//!
//! Persists the whole [`ScheduleState`] as a single JSON document at
//! `<home>/.quill/schedule.json`. The document is always loaded fully and
//! rewritten fully — no partial updates, no append log. Writes use the same
//! atomic `.tmp` + rename pattern as the config.
//!
//! The store is a handle over its directory so a future per-entry backend can
//! replace the internals without changing the engine's contract.

use std::path::{Path, PathBuf};

use crate::config::app_dir_at;
use crate::error::{io_err, CoreError};
use crate::types::ScheduleState;

/// `<home>/.quill/schedule.json` — pure, no I/O.
pub fn state_path_at(home: &Path) -> PathBuf {
    app_dir_at(home).join("schedule.json")
}

/// Handle to the persisted schedule document.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    /// Store rooted at an explicit home directory (tests use `TempDir`).
    pub fn open_at(home: &Path) -> Self {
        Self {
            path: state_path_at(home),
        }
    }

    /// Path of the underlying document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full schedule document.
    ///
    /// A missing file is an empty map, not an error: all projects bootstrap
    /// as due on first run.
    pub fn load(&self) -> Result<ScheduleState, CoreError> {
        if !self.path.exists() {
            return Ok(ScheduleState::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| io_err(&self.path, e))?;
        if contents.trim().is_empty() {
            return Ok(ScheduleState::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Atomically rewrite the full schedule document.
    pub fn save(&self, state: &ScheduleState) -> Result<(), CoreError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid schedule state path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}
