//! `quill run-once` — the scheduled entry point.
//!
//! Whatever invokes this periodically (a systemd timer, launchd, cron) is
//! outside quill; this command only decides how much work one invocation
//! does: a full pass when on AC power and configured for it, otherwise a
//! due-only pass.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use quill_core::{config, Project};
use quill_git::remote_url;
use quill_sync::{
    connectivity::{self, PROBE_TIMEOUT},
    engine,
    power::{self, RunKind},
    Collaborators, SyncError,
};

use crate::api;
use crate::commands::sync::print_report;

/// Arguments for `quill run-once`.
#[derive(Args, Debug)]
pub struct RunOnceArgs {}

impl RunOnceArgs {
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
        let plugged = power::is_plugged_in();
        match power::route(cfg.full_sync_on_ac, plugged) {
            RunKind::Full => {
                let report =
                    engine::full_sync_at(&home, &cfg, now, &collab).context("full sync failed")?;
                print_report(&report);
            }
            RunKind::Due => {
                let report =
                    engine::due_run_at(&home, &cfg, now, &collab).context("due run failed")?;
                if report.nothing_due {
                    println!("Nothing due; next timers have not expired yet.");
                } else if report.skipped_offline {
                    if let Some(summary) = &report.summary {
                        println!("{} {summary}", "!".yellow().bold());
                    }
                } else {
                    print_report(&report);
                }
            }
        }
        Ok(())
    }
}
