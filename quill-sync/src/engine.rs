//! Reconciliation engine.
//!
//! The canonical entry points for both `quill sync` (full pass + prune) and
//! the scheduled due-run. One invocation is single-threaded and sequential in
//! input-list order: clone/pull work is bandwidth- and disk-bound, and the
//! whole-document state rewrite stays trivially consistent that way.
//!
//! Failure posture is all-or-nothing: the first clone/pull failure aborts the
//! remaining projects and propagates. Retry happens across invocations via
//! the backoff schedule, never inline.

use std::collections::BTreeSet;
use std::path::Path;

use quill_core::{
    folder::folder_name_for, runlog, types::MIN_INTERVAL_SEC, Config, Project, RunLock,
    ScheduleStore, TrackedEntry,
};
use quill_git::{
    detect_default_branch, ensure_clone, ensure_remote, local_branch_head, pull,
    remote_branch_head,
};

use crate::backoff;
use crate::due;
use crate::error::SyncError;
use crate::prune::{prune_unexpected, PruneReport};

/// External collaborators a reconciliation pass needs but does not own: the
/// authenticated project source, the connectivity probe, and the bridge URL
/// scheme with the credential already embedded.
pub struct Collaborators<'a> {
    /// Ordered list of the top-N most recently updated tracked projects.
    pub projects: &'a dyn Fn() -> Result<Vec<Project>, SyncError>,
    /// Cheap pre-flight reachability probe for the remote service.
    pub online: &'a dyn Fn() -> bool,
    /// Remote URL of one project's git bridge.
    pub bridge_url: &'a dyn Fn(&Project) -> String,
}

/// What a completed pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Projects whose heads were compared.
    pub checked: usize,
    /// Projects that received a pull (or were counted changed).
    pub pulled: usize,
    /// Due-run found nothing due and returned before any network access.
    pub nothing_due: bool,
    /// Due-run hit the offline gate and rescheduled instead of syncing.
    pub skipped_offline: bool,
    /// Prune outcome (full sync only).
    pub prune: Option<PruneReport>,
    /// The summary line appended to the run log, when one was written.
    pub summary: Option<String>,
}

/// Manual full sync: every tracked project, then the prune pass.
///
/// Offline is a hard abort here — a failed interactive attempt must not
/// perturb the timers.
pub fn full_sync_at(
    home: &Path,
    cfg: &Config,
    now: i64,
    collab: &Collaborators<'_>,
) -> Result<RunReport, SyncError> {
    let credential = cfg.git_token.as_deref().ok_or(SyncError::MissingCredential)?;
    ensure_base_dir(cfg)?;

    if !(collab.online)() {
        let _ = runlog::append_at(home, "Manual sync aborted (no internet)");
        return Err(SyncError::Connectivity {
            web_host: cfg.host.clone(),
            git_host: cfg.git_host.clone(),
        });
    }

    let _lock = RunLock::acquire_at(home)?;
    let store = ScheduleStore::open_at(home);
    let mut state = store.load()?;

    let projects = (collab.projects)()?;

    let mut report = RunReport::default();
    for project in &projects {
        let folder = folder_name_for(&project.name, &project.id.0);
        let mut entry = state
            .projects
            .get(&project.id)
            .cloned()
            .unwrap_or_else(|| TrackedEntry::bootstrap(&project.name, &folder));
        entry.name = project.name.clone();
        entry.folder = folder;

        let changed = reconcile_project(cfg, credential, project, &mut entry, now, collab)?;
        report.checked += 1;
        if changed {
            report.pulled += 1;
        }
        state.projects.insert(project.id.clone(), entry);
    }

    let expected: BTreeSet<String> = projects
        .iter()
        .map(|p| folder_name_for(&p.name, &p.id.0))
        .collect();
    let prune = prune_unexpected(&cfg.base_dir, &expected);

    store.save(&state)?;

    let mut summary = format!(
        "Synced {} projects into {}",
        projects.len(),
        cfg.base_dir.display()
    );
    if !prune.is_empty() {
        summary.push_str(&format!(
            "; pruned {} old, {} lingering",
            prune.removed.len(),
            prune.lingering.len()
        ));
    }
    report.summary = Some(runlog::append_at(home, &summary)?);
    report.prune = Some(prune);
    Ok(report)
}

/// Automatic due-run: only projects whose timers have expired.
///
/// Returns early (no probe, no listing) when nothing is due. Offline pushes
/// every due timer to `now + 30m` and reports a skip instead of erroring —
/// a flapping connection must not cause a tight retry loop.
pub fn due_run_at(
    home: &Path,
    cfg: &Config,
    now: i64,
    collab: &Collaborators<'_>,
) -> Result<RunReport, SyncError> {
    let credential = cfg.git_token.as_deref().ok_or(SyncError::MissingCredential)?;
    ensure_base_dir(cfg)?;

    let _lock = RunLock::acquire_at(home)?;
    let store = ScheduleStore::open_at(home);
    let mut state = store.load()?;

    if !state.any_due(now) {
        tracing::debug!("nothing due; skipping connectivity probe and listing");
        return Ok(RunReport {
            nothing_due: true,
            ..RunReport::default()
        });
    }

    if !(collab.online)() {
        for id in due::due_ids(&state, now) {
            if let Some(entry) = state.projects.get_mut(&id) {
                entry.next_due_ts = now + MIN_INTERVAL_SEC;
            }
        }
        store.save(&state)?;
        let line = runlog::append_at(
            home,
            "Runner skipped (no internet); rescheduled due projects in 30m",
        )?;
        return Ok(RunReport {
            skipped_offline: true,
            summary: Some(line),
            ..RunReport::default()
        });
    }

    let projects = (collab.projects)()?;

    let mut report = RunReport::default();
    for project in &projects {
        let due_now = due::is_due(&state, &project.id, now);
        let folder = folder_name_for(&project.name, &project.id.0);
        let mut entry = state
            .projects
            .get(&project.id)
            .cloned()
            .unwrap_or_else(|| TrackedEntry::bootstrap(&project.name, &folder));
        entry.name = project.name.clone();
        entry.folder = folder;

        if !due_now {
            // Not due: refresh the denormalized fields only.
            state.projects.insert(project.id.clone(), entry);
            continue;
        }

        let changed = reconcile_project(cfg, credential, project, &mut entry, now, collab)?;
        report.checked += 1;
        if changed {
            report.pulled += 1;
        }
        state.projects.insert(project.id.clone(), entry);
    }

    store.save(&state)?;

    let summary = format!(
        "Synced {} due project(s); checked {}; next cadence min 30m",
        report.pulled, report.checked
    );
    report.summary = Some(runlog::append_at(home, &summary)?);
    Ok(report)
}

/// One project's turn: ensure clone + remote, detect the branch, compare
/// heads, pull when changed, and step the backoff state.
///
/// `changed` is conservative: an undeterminable head on either side counts
/// as changed. Never "optimize" that into unchanged — staleness would grow
/// silently unbounded.
fn reconcile_project(
    cfg: &Config,
    credential: &str,
    project: &Project,
    entry: &mut TrackedEntry,
    now: i64,
    collab: &Collaborators<'_>,
) -> Result<bool, SyncError> {
    let url = (collab.bridge_url)(project);
    let repo = ensure_clone(&cfg.base_dir, &entry.folder, &url, Some(credential))?;
    ensure_remote(&repo, &url, Some(credential))?;

    let branch = detect_default_branch(&repo);
    let remote_head = remote_branch_head(&repo, &branch);
    let local_head = local_branch_head(&repo, &branch);
    let changed =
        remote_head.is_none() || local_head.is_none() || remote_head != local_head;

    tracing::debug!(
        "{}: branch={branch} remote={remote_head:?} local={local_head:?} changed={changed}",
        project.id
    );

    if changed {
        pull(&repo, &branch, Some(credential))?;
    }
    backoff::apply(entry, changed, now);
    Ok(changed)
}

fn ensure_base_dir(cfg: &Config) -> Result<(), SyncError> {
    std::fs::create_dir_all(&cfg.base_dir).map_err(|e| {
        SyncError::Core(quill_core::error::CoreError::Io {
            path: cfg.base_dir.clone(),
            source: e,
        })
    })
}
