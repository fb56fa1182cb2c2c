//! `quill sync` — manual full reconciliation pass.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use quill_core::{config, Project};
use quill_git::remote_url;
use quill_sync::{
    connectivity::{self, PROBE_TIMEOUT},
    engine, Collaborators, RunReport, SyncError,
};

use crate::api;

/// Arguments for `quill sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let cfg = config::load_at(&home)?;

        let fetch = || -> Result<Vec<Project>, SyncError> {
            api::list_projects(&cfg.host, cfg.session_cookie.as_deref(), cfg.project_count)
                .map_err(|e| SyncError::ProjectSource {
                    message: e.to_string(),
                })
        };
        let online = || connectivity::is_online(&cfg, PROBE_TIMEOUT);
        let url_for =
            |p: &Project| remote_url(&cfg.git_host, &p.id.0, cfg.git_token.as_deref());
        let collab = Collaborators {
            projects: &fetch,
            online: &online,
            bridge_url: &url_for,
        };

        let now = Utc::now().timestamp();
        let report = engine::full_sync_at(&home, &cfg, now, &collab).context("full sync failed")?;
        print_report(&report);
        Ok(())
    }
}

pub(crate) fn print_report(report: &RunReport) {
    if let Some(summary) = &report.summary {
        println!("{} {summary}", "✓".green().bold());
    }
    if let Some(prune) = &report.prune {
        if !prune.lingering.is_empty() {
            println!(
                "Lingering old projects (cannot delete safely): {}",
                prune.lingering.len()
            );
            for path in prune.lingering.iter().take(5) {
                println!("  - {}", path.display());
            }
        }
    }
}
