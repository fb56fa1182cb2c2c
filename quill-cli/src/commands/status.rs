//! `quill status` — mirror health, runner health, and upcoming check times.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use quill_core::{config, folder::folder_name_for, runlog, ScheduleStore};
use quill_sync::{
    prune::{prune_unexpected, PruneReport},
    status::{classify_project, classify_runner, next_due_rows, run_audit, AuditReport, DueRow,
             RunnerHealth},
};

use crate::api;

/// Arguments for `quill status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Also remove departed clones that are provably safe to delete.
    #[arg(long)]
    pub prune: bool,
}

#[derive(Serialize)]
struct StatusJson {
    summary: SummaryJson,
    issues: Vec<String>,
    runner: RunnerHealth,
    next_due: Vec<DueRowJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prune: Option<PruneJson>,
}

#[derive(Serialize)]
struct SummaryJson {
    total: usize,
    up_to_date: usize,
    missing: usize,
    outdated: usize,
}

#[derive(Serialize)]
struct DueRowJson {
    name: String,
    when: String,
    scheduled_at: String,
}

#[derive(Serialize)]
struct PruneJson {
    removed: Vec<PathBuf>,
    lingering: Vec<PathBuf>,
}

#[derive(Tabled)]
struct DueTableRow {
    #[tabled(rename = "project")]
    name: String,
    #[tabled(rename = "next check")]
    when: String,
    #[tabled(rename = "scheduled")]
    scheduled: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let cfg = config::load_at(&home)?;

        let projects = api::list_projects(
            &cfg.host,
            cfg.session_cookie.as_deref(),
            cfg.project_count,
        )
        .context("failed to list projects")?;

        let audit = run_audit(&projects, |p| classify_project(&cfg.base_dir, p));

        let prune = if self.prune {
            let expected: BTreeSet<String> = projects
                .iter()
                .map(|p| folder_name_for(&p.name, &p.id.0))
                .collect();
            Some(prune_unexpected(&cfg.base_dir, &expected))
        } else {
            None
        };

        let now = Utc::now().timestamp();
        let app_tail = runlog::tail(&runlog::app_log_path_at(&home), 200);
        let err_path = config::app_dir_at(&home).join("logs").join("runner.err.log");
        let err_tail = runlog::tail(&err_path, 200);
        let runner = classify_runner(&app_tail, &err_tail, cfg.runner_interval.as_secs(), now);

        let state = ScheduleStore::open_at(&home).load()?;
        let due_rows = next_due_rows(&state, now);

        if self.json {
            print_json(&audit, runner, &due_rows, prune)?;
        } else {
            print_human(&cfg, &audit, &runner, &due_rows, prune.as_ref());
        }
        Ok(())
    }
}

fn print_json(
    audit: &AuditReport,
    runner: RunnerHealth,
    due_rows: &[DueRow],
    prune: Option<PruneReport>,
) -> Result<()> {
    let payload = StatusJson {
        summary: SummaryJson {
            total: audit.total,
            up_to_date: audit.up_to_date,
            missing: audit.missing,
            outdated: audit.outdated,
        },
        issues: audit.issues.clone(),
        runner,
        next_due: due_rows
            .iter()
            .map(|row| DueRowJson {
                name: row.name.clone(),
                when: row.bucket.clone(),
                scheduled_at: format_ts(row.scheduled_ts),
            })
            .collect(),
        prune: prune.map(|p| PruneJson {
            removed: p.removed,
            lingering: p.lingering,
        }),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_human(
    cfg: &quill_core::Config,
    audit: &AuditReport,
    runner: &RunnerHealth,
    due_rows: &[DueRow],
    prune: Option<&PruneReport>,
) {
    println!(
        "quill v{} | {} tracked | {} up to date | {} missing | {} outdated",
        env!("CARGO_PKG_VERSION"),
        audit.total,
        audit.up_to_date,
        audit.missing,
        audit.outdated,
    );
    println!("Scheduler: interval={}, base dir={}", cfg.runner_interval, cfg.base_dir.display());

    println!("\n=== Runner ===");
    match runner {
        RunnerHealth::Ok { last_success } => {
            println!("{} {last_success}", "Background runner OK.".green().bold());
        }
        RunnerHealth::Offline { last_line } => {
            println!(
                "{} {last_line}",
                "Background runner STALE (offline).".yellow().bold()
            );
        }
        RunnerHealth::Stale { last_success } => {
            println!(
                "{} last success: {last_success}",
                "Background runner STALE (missed schedule?).".yellow().bold()
            );
        }
        RunnerHealth::Error { line } => {
            println!("{} {line}", "Background runner ERROR.".red().bold());
            println!("Hint: check the runner service and its logs, then re-run `quill run-once`.");
        }
        RunnerHealth::NotYetSuccessful => {
            println!("No successful background run recorded yet.");
        }
    }

    if !due_rows.is_empty() {
        println!("\n=== Timers (next due) ===");
        let rows: Vec<DueTableRow> = due_rows
            .iter()
            .map(|row| DueTableRow {
                name: row.name.clone(),
                when: row.bucket.clone(),
                scheduled: format_ts(row.scheduled_ts),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if let Some(prune) = prune {
        if !prune.removed.is_empty() {
            println!("\nPruned {} old project(s).", prune.removed.len());
        }
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

    if !audit.issues.is_empty() {
        println!("\n=== Issues ===");
        for issue in &audit.issues {
            println!("- {issue}");
        }
    }
}

fn format_ts(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}
