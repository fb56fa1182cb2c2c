//! Append-only run log.
//!
//! Every completed run appends exactly one line to `~/.quill/logs/app.log`:
//!
//! ```text
//! [2024-05-03T14:30:00] Synced 3 due project(s); checked 7
//! ```
//!
//! The status reporter reads the tail back and keys off two fixed markers:
//! `] Synced` for a successful run, `Runner skipped (no internet)` for an
//! offline skip. Plain lines, no logging framework — the file is machine-read.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};

use crate::config::logs_dir_at;
use crate::error::{io_err, CoreError};

/// Substring marking a successful run line.
pub const SUCCESS_MARKER: &str = "] Synced";

/// Substring marking an offline-skip line.
pub const OFFLINE_MARKER: &str = "Runner skipped (no internet)";

/// `<home>/.quill/logs/app.log` — pure, no I/O.
pub fn app_log_path_at(home: &Path) -> PathBuf {
    crate::config::app_dir_at(home).join("logs").join("app.log")
}

/// Format a run summary into the canonical bracketed-timestamp line.
pub fn format_line(timestamp_iso: &str, summary: &str) -> String {
    format!("[{timestamp_iso}] {summary}")
}

/// Append one summary line (timestamped now) to the app log.
///
/// Returns the full line that was written so callers can echo it.
pub fn append_at(home: &Path, summary: &str) -> Result<String, CoreError> {
    let dir = logs_dir_at(home)?;
    let path = dir.join("app.log");
    let stamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
    let line = format_line(&stamp, summary);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| io_err(&path, e))?;
    writeln!(file, "{line}").map_err(|e| io_err(&path, e))?;
    Ok(line)
}

/// Last `limit` lines of a log file; empty when the file is missing or
/// unreadable (log evidence is best-effort, never fatal).
pub fn tail(path: &Path, limit: usize) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let lines: Vec<String> = contents.lines().map(str::to_owned).collect();
    let start = lines.len().saturating_sub(limit);
    lines[start..].to_vec()
}
