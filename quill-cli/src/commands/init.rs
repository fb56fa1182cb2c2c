//! `quill init` — write the configuration file from flags.
//!
//! Deliberately prompt-free so it can run from provisioning scripts; there is
//! no interactive first-run flow.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use quill_core::config::{self, RunnerInterval};
use quill_core::Config;

/// Arguments for `quill init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to mirror projects into (default: ~/Quill).
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Web host of the collaboration service.
    #[arg(long, default_value = "www.overleaf.com")]
    pub host: String,

    /// Host of the companion git bridge.
    #[arg(long, default_value = "git.overleaf.com")]
    pub git_host: String,

    /// How many of the most recently updated projects to track.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// External runner cadence (drives the staleness check in `status`).
    #[arg(long, default_value = "1h")]
    pub interval: RunnerInterval,

    /// Session cookie header value for the project listing API.
    #[arg(long)]
    pub session_cookie: Option<String>,

    /// Stay with due-only passes even on AC power.
    #[arg(long)]
    pub no_full_sync_on_ac: bool,

    /// Overwrite an existing configuration.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let path = config::config_path_at(&home);
        if path.exists() && !self.force {
            bail!(
                "config already exists at {}; pass --force to overwrite",
                path.display()
            );
        }

        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => home.join("Quill"),
        };
        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("could not create base dir {}", base_dir.display()))?;

        let mut cfg = Config::new(base_dir);
        cfg.host = self.host;
        cfg.git_host = self.git_host;
        cfg.project_count = self.count;
        cfg.runner_interval = self.interval;
        cfg.session_cookie = self.session_cookie;
        cfg.full_sync_on_ac = !self.no_full_sync_on_ac;

        config::save_at(&home, &cfg).context("failed to save config")?;
        println!("Saved config to {}", path.display());
        println!("Next: run `quill set-token <token>` to enable clone/pull.");
        Ok(())
    }
}
