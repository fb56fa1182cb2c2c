//! `quill projects` — list the tracked remote projects.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use quill_core::config;
use quill_core::folder::folder_name_for;

use crate::api;

/// Arguments for `quill projects`.
#[derive(Args, Debug)]
pub struct ProjectsArgs {}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "folder")]
    folder: String,
    #[tabled(rename = "last updated")]
    last_updated: String,
}

impl ProjectsArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let cfg = config::load_at(&home)?;
        let projects = api::list_projects(
            &cfg.host,
            cfg.session_cookie.as_deref(),
            cfg.project_count,
        )
        .context("failed to list projects")?;

        if projects.is_empty() {
            println!("No projects found.");
            return Ok(());
        }

        let rows: Vec<ProjectRow> = projects
            .iter()
            .map(|p| ProjectRow {
                name: p.name.clone(),
                id: p.id.to_string(),
                folder: folder_name_for(&p.name, &p.id.0),
                last_updated: format_millis(p.last_updated),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "unknown".to_owned();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown".to_owned(),
    }
}
