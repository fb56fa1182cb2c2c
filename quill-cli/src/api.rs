//! Project-listing API client.
//!
//! Speaks to the collaboration service's `/api/project` endpoint with the
//! operator's session cookie and returns the canonical [`Project`] records,
//! most recently updated first. This is the whole of quill's knowledge about
//! the web API — authentication acquisition lives elsewhere.

use anyhow::{Context, Result};
use serde::Deserialize;

use quill_core::{Project, ProjectId};

#[derive(Debug, Deserialize)]
struct ProjectListResponse {
    projects: Vec<ApiProject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProject {
    id: String,
    name: String,
    #[serde(default)]
    last_updated: i64,
}

/// Fetch the `limit` most recently updated projects.
pub fn list_projects(
    host: &str,
    session_cookie: Option<&str>,
    limit: usize,
) -> Result<Vec<Project>> {
    let url = format!("https://{host}/api/project");
    let mut request = ureq::get(&url);
    if let Some(cookie) = session_cookie {
        request = request.set("Cookie", cookie);
    }
    let response = request
        .call()
        .with_context(|| format!("project listing request to {host} failed"))?;
    let payload: ProjectListResponse = response
        .into_json()
        .context("project listing response was not valid JSON")?;

    let mut projects: Vec<Project> = payload
        .projects
        .into_iter()
        .map(|p| Project {
            id: ProjectId(p.id),
            name: p.name,
            last_updated: p.last_updated,
        })
        .collect();
    projects.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    projects.truncate(limit);
    Ok(projects)
}
