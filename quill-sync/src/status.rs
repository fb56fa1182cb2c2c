//! Status and health reporting.
//!
//! Read-only audit of the tracked set (bounded worker pool), background
//! runner health derived from log evidence, and the "next due" table. One
//! project's failure folds into its own classification and never suppresses
//! the rest of the audit.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use chrono::DateTime;
use serde::Serialize;

use quill_core::{
    folder::folder_name_for,
    runlog::{OFFLINE_MARKER, SUCCESS_MARKER},
    Project, ScheduleState,
};
use quill_git::{detect_default_branch, local_branch_head, remote_branch_head, repo_exists};

/// Upper bound on audit worker threads.
pub const MAX_AUDIT_WORKERS: usize = 16;

/// How many issue reasons the report surfaces.
pub const MAX_ISSUES: usize = 10;

/// How many rows the next-due table shows.
pub const MAX_DUE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Per-project audit
// ---------------------------------------------------------------------------

/// Sync classification of one tracked project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ProjectSyncState {
    /// Local and remote heads match.
    UpToDate,
    /// No local clone exists yet.
    Missing { reason: String },
    /// Heads differ, heads are undeterminable, or the check itself failed.
    Outdated { reason: String },
}

/// Aggregated audit over the tracked set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub up_to_date: usize,
    pub missing: usize,
    pub outdated: usize,
    /// Human-readable reasons, input-list order, capped at [`MAX_ISSUES`].
    pub issues: Vec<String>,
}

/// Classify one project by comparing heads; read-only.
///
/// An undeterminable head on either side is an issue (reported distinctly),
/// never silently "fine".
pub fn classify_project(base_dir: &Path, project: &Project) -> ProjectSyncState {
    let folder = folder_name_for(&project.name, &project.id.0);
    let repo = base_dir.join(folder);
    if !repo_exists(&repo) {
        return ProjectSyncState::Missing {
            reason: format!("Missing: {}", project.name),
        };
    }

    let branch = detect_default_branch(&repo);
    let remote = remote_branch_head(&repo, &branch);
    let local = local_branch_head(&repo, &branch);
    match (remote, local) {
        (Some(remote), Some(local)) if remote == local => ProjectSyncState::UpToDate,
        (Some(remote), Some(local)) => ProjectSyncState::Outdated {
            reason: format!(
                "Outdated: {} (remote {} vs local {})",
                project.name,
                &remote[..remote.len().min(7)],
                &local[..local.len().min(7)]
            ),
        },
        _ => ProjectSyncState::Outdated {
            reason: format!("Outdated: {} (unable to determine heads)", project.name),
        },
    }
}

/// Audit all projects concurrently over a bounded worker pool of
/// `min(16, N)` threads, wait-for-all, then aggregate.
///
/// A panicking check becomes that project's "outdated: error" entry; sibling
/// workers are unaffected.
pub fn run_audit<F>(projects: &[Project], check: F) -> AuditReport
where
    F: Fn(&Project) -> ProjectSyncState + Sync,
{
    let total = projects.len();
    if total == 0 {
        return AuditReport::default();
    }

    let workers = MAX_AUDIT_WORKERS.min(total);
    let next_job = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, ProjectSyncState)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next_job = &next_job;
            let check = &check;
            scope.spawn(move || loop {
                let idx = next_job.fetch_add(1, Ordering::SeqCst);
                if idx >= total {
                    break;
                }
                let project = &projects[idx];
                let state = catch_unwind(AssertUnwindSafe(|| check(project))).unwrap_or_else(
                    |_| ProjectSyncState::Outdated {
                        reason: format!("Outdated: {} (error: check panicked)", project.name),
                    },
                );
                // Receiver outlives the scope; a send failure means the
                // audit was abandoned and the result no longer matters.
                let _ = tx.send((idx, state));
            });
        }
        drop(tx);
    });

    let mut results: Vec<(usize, ProjectSyncState)> = rx.iter().collect();
    results.sort_by_key(|(idx, _)| *idx);

    let mut report = AuditReport {
        total,
        ..AuditReport::default()
    };
    for (_, state) in results {
        match state {
            ProjectSyncState::UpToDate => report.up_to_date += 1,
            ProjectSyncState::Missing { reason } => {
                report.missing += 1;
                if report.issues.len() < MAX_ISSUES {
                    report.issues.push(reason);
                }
            }
            ProjectSyncState::Outdated { reason } => {
                report.outdated += 1;
                if report.issues.len() < MAX_ISSUES {
                    report.issues.push(reason);
                }
            }
        }
    }
    report
}

// ---------------------------------------------------------------------------
// Runner health from log evidence
// ---------------------------------------------------------------------------

/// Background runner health, derived from the app log tail and the runner's
/// error stream. Precedence: error > offline > stale > ok > never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum RunnerHealth {
    Ok { last_success: String },
    Offline { last_line: String },
    Stale { last_success: String },
    Error { line: String },
    NotYetSuccessful,
}

const ERROR_MARKERS: [&str; 3] = ["Error", "error:", "panicked"];

/// Classify runner health from log tails.
///
/// `interval_sec` is the configured external-timer cadence; a success older
/// than 1.5× that counts as stale (the timer has missed at least one slot).
pub fn classify_runner(
    app_tail: &[String],
    err_tail: &[String],
    interval_sec: i64,
    now: i64,
) -> RunnerHealth {
    if let Some(line) = err_tail
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty() && ERROR_MARKERS.iter().any(|m| l.contains(m)))
    {
        return RunnerHealth::Error { line: line.clone() };
    }

    // Most recent relevant line decides between success and offline-skip.
    for line in app_tail.iter().rev() {
        if line.contains(OFFLINE_MARKER) {
            return RunnerHealth::Offline {
                last_line: line.clone(),
            };
        }
        if line.contains(SUCCESS_MARKER) {
            if let Some(ts) = line_timestamp(line) {
                if now - ts > interval_sec * 3 / 2 {
                    return RunnerHealth::Stale {
                        last_success: line.clone(),
                    };
                }
            }
            return RunnerHealth::Ok {
                last_success: line.clone(),
            };
        }
    }
    RunnerHealth::NotYetSuccessful
}

/// Unix seconds parsed from a `[ISO8601] …` log line prefix.
fn line_timestamp(line: &str) -> Option<i64> {
    let start = line.find('[')? + 1;
    let end = line.find(']')?;
    let stamp = line.get(start..end)?;
    DateTime::parse_from_rfc3339(stamp)
        .ok()
        .map(|dt| dt.timestamp())
}

// ---------------------------------------------------------------------------
// Next-due table
// ---------------------------------------------------------------------------

/// One row of the next-due table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueRow {
    pub name: String,
    pub scheduled_ts: i64,
    pub bucket: String,
}

/// Display bucket for one entry's deadline.
///
/// Overdue time beyond the entry's own interval means the runner has not
/// serviced it for a full cycle — that is stale, not merely due.
pub fn due_bucket(next_due_ts: i64, interval_sec: i64, now: i64) -> String {
    let delta = next_due_ts - now;
    if delta <= 0 {
        let overdue = -delta;
        if overdue > interval_sec {
            format!("stale (overdue by {}h)", overdue / 3600)
        } else {
            "due now".to_owned()
        }
    } else {
        let minutes = delta / 60;
        if minutes < 60 {
            format!("in {minutes}m")
        } else {
            format!("in {}h", minutes / 60)
        }
    }
}

/// The 10 soonest entries by deadline, ascending.
pub fn next_due_rows(state: &ScheduleState, now: i64) -> Vec<DueRow> {
    let mut rows: Vec<DueRow> = state
        .projects
        .values()
        .map(|entry| DueRow {
            name: entry.name.clone(),
            scheduled_ts: entry.next_due_ts,
            bucket: due_bucket(entry.next_due_ts, entry.interval_sec, now),
        })
        .collect();
    rows.sort_by_key(|row| row.scheduled_ts);
    rows.truncate(MAX_DUE_ROWS);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
