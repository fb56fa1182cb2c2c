//! Due-set selection.
//!
//! An entry is due once its deadline has passed; a project with no entry yet
//! is always due (new projects bootstrap immediately).

use quill_core::types::{ProjectId, ScheduleState};

/// Is this project due for a network round-trip?
pub fn is_due(state: &ScheduleState, id: &ProjectId, now: i64) -> bool {
    match state.projects.get(id) {
        Some(entry) => entry.is_due(now),
        None => true,
    }
}

/// Ids of every tracked entry currently due (does not include untracked
/// projects, which are implicitly due — callers iterate the project list for
/// those).
pub fn due_ids(state: &ScheduleState, now: i64) -> Vec<ProjectId> {
    state
        .projects
        .iter()
        .filter(|(_, entry)| entry.is_due(now))
        .map(|(id, _)| id.clone())
        .collect()
}
