//! `quill set-token` — store the git bridge credential.

use anyhow::{Context, Result};
use clap::Args;

use quill_core::config;

/// Arguments for `quill set-token`.
#[derive(Args, Debug)]
pub struct SetTokenArgs {
    /// The git bridge token. Stored in the config file (mode 0600); only
    /// ever used inside remote URLs and redacted from all output.
    pub token: String,
}

impl SetTokenArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home()?;
        let mut cfg = config::load_at(&home).context("load config")?;
        cfg.git_token = Some(self.token);
        config::save_at(&home, &cfg).context("save config")?;
        println!(
            "Git token saved to {}",
            config::config_path_at(&home).display()
        );
        Ok(())
    }
}
