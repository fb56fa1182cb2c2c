//! Domain types for the quill schedule registry.
//!
//! All timestamps are plain unix seconds (`i64`) so scheduling arithmetic is
//! deterministic and testable; `chrono` is only used at the display edges.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest allowed per-project backoff interval: 30 minutes.
pub const MIN_INTERVAL_SEC: i64 = 1800;

/// Largest allowed per-project backoff interval: 24 hours.
pub const MAX_INTERVAL_SEC: i64 = 86400;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque, stable identifier a remote project is known by upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A remote collaborative writing project as reported by the project source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Display name; mutable upstream.
    pub name: String,
    /// Remote-reported last-modified time (unix millis upstream); used only
    /// for the top-N ordering done by the project source.
    #[serde(default)]
    pub last_updated: i64,
}

/// Per-project schedule state: current backoff interval and next due time.
///
/// `name` and `folder` are denormalized copies refreshed every time the entry
/// is touched; they exist for display and debugging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub name: String,
    pub folder: String,
    pub interval_sec: i64,
    pub next_due_ts: i64,
}

impl TrackedEntry {
    /// Fresh entry for a project never seen before: minimum interval,
    /// due immediately.
    pub fn bootstrap(name: &str, folder: &str) -> Self {
        Self {
            name: name.to_owned(),
            folder: folder.to_owned(),
            interval_sec: MIN_INTERVAL_SEC,
            next_due_ts: 0,
        }
    }

    /// An entry is due once its deadline has passed.
    pub fn is_due(&self, now: i64) -> bool {
        self.next_due_ts <= now
    }
}

/// The whole persisted schedule document: project id → tracked entry.
///
/// `BTreeMap` keeps serialization order stable across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    #[serde(default)]
    pub projects: BTreeMap<ProjectId, TrackedEntry>,
}

impl ScheduleState {
    /// True when at least one tracked entry is due, or when the state is
    /// empty (fresh installs must seed the schedule immediately).
    pub fn any_due(&self, now: i64) -> bool {
        self.projects.is_empty() || self.projects.values().any(|e| e.is_due(now))
    }
}

/// Clamp an interval into the allowed backoff band.
pub fn clamp_interval(interval_sec: i64) -> i64 {
    interval_sec.clamp(MIN_INTERVAL_SEC, MAX_INTERVAL_SEC)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
