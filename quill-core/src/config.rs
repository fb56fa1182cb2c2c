//! Operator configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.quill/
//!   config.yaml     (operator settings — written by `quill init`)
//!   schedule.json   (per-project backoff state — see `state`)
//!   quill.lock      (advisory run lock — see `lock`)
//!   logs/
//!     app.log       (one line per completed run — see `runlog`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// The external timer cadence the operator registered for `quill run-once`.
///
/// quill does not install that timer; the value only drives the staleness
/// threshold in `quill status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunnerInterval {
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "24h")]
    Daily,
}

impl RunnerInterval {
    pub fn as_secs(self) -> i64 {
        match self {
            RunnerInterval::ThirtyMinutes => 1800,
            RunnerInterval::Hourly => 3600,
            RunnerInterval::TwelveHours => 43200,
            RunnerInterval::Daily => 86400,
        }
    }
}

impl fmt::Display for RunnerInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunnerInterval::ThirtyMinutes => "30m",
            RunnerInterval::Hourly => "1h",
            RunnerInterval::TwelveHours => "12h",
            RunnerInterval::Daily => "24h",
        };
        f.write_str(s)
    }
}

impl FromStr for RunnerInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30m" => Ok(RunnerInterval::ThirtyMinutes),
            "1h" => Ok(RunnerInterval::Hourly),
            "12h" => Ok(RunnerInterval::TwelveHours),
            "24h" => Ok(RunnerInterval::Daily),
            other => Err(format!(
                "unknown interval '{other}'; expected: 30m, 1h, 12h, 24h"
            )),
        }
    }
}

/// Operator configuration, persisted as YAML at `~/.quill/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory the local clones live under.
    pub base_dir: PathBuf,
    /// Web host of the collaboration service (project listing API).
    pub host: String,
    /// Host of the companion git bridge.
    pub git_host: String,
    /// How many of the most recently updated projects to track.
    pub project_count: usize,
    /// Git bridge token; embedded in remote URLs, never logged unredacted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_token: Option<String>,
    /// Session cookie header value for the project listing API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    /// Run a full sync instead of a due-run when on AC power.
    pub full_sync_on_ac: bool,
    /// Cadence of the external timer invoking `quill run-once`.
    #[serde(default)]
    pub runner_interval: RunnerInterval,
}

impl Config {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            host: "www.overleaf.com".to_owned(),
            git_host: "git.overleaf.com".to_owned(),
            project_count: 10,
            git_token: None,
            session_cookie: None,
            full_sync_on_ac: true,
            runner_interval: RunnerInterval::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.quill/`
pub fn app_dir_at(home: &Path) -> PathBuf {
    home.join(".quill")
}

/// `<home>/.quill/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    app_dir_at(home).join("config.yaml")
}

/// `<home>/.quill/logs/` — created if absent.
pub fn logs_dir_at(home: &Path) -> Result<PathBuf, CoreError> {
    let dir = app_dir_at(home).join("logs");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }
    Ok(dir)
}

/// Resolve the real home directory.
pub fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::DirNotFound { kind: "home" })
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load config from `<home>/.quill/config.yaml`.
///
/// Returns `CoreError::ConfigNotFound` if the file does not exist,
/// `CoreError::ConfigParse` (with path context) if malformed.
pub fn load_at(home: &Path) -> Result<Config, CoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(CoreError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::ConfigParse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, CoreError> {
    load_at(&home()?)
}

/// Atomically save config to `<home>/.quill/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The token and cookie live in this file, hence the tight mode.
pub fn save_at(home: &Path, config: &Config) -> Result<(), CoreError> {
    let dir = app_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), CoreError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
