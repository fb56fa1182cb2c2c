//! quill — keep remote collaborative writing projects mirrored into local
//! git clones.
//!
//! # Usage
//!
//! ```text
//! quill init --base-dir <path> [--host <host>] [--git-host <host>] [--count <n>]
//!            [--interval 30m|1h|12h|24h] [--session-cookie <cookie>] [--force]
//! quill set-token <token>
//! quill projects
//! quill sync
//! quill run-once
//! quill status [--json] [--prune]
//! ```
//!
//! `sync` is the manual full pass (clone/pull everything, then prune).
//! `run-once` is the entry point an external timer invokes; it routes to a
//! full pass or a due-only pass depending on power state and configuration.

mod api;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    init::InitArgs, projects::ProjectsArgs, run_once::RunOnceArgs, set_token::SetTokenArgs,
    status::StatusArgs, sync::SyncArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "quill",
    version,
    about = "Mirror remote collaborative writing projects into local git clones",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the quill configuration file.
    Init(InitArgs),

    /// Store the git bridge token used for clone and pull.
    SetToken(SetTokenArgs),

    /// List the tracked remote projects.
    Projects(ProjectsArgs),

    /// Full sync: clone/pull every tracked project, then prune departed ones.
    Sync(SyncArgs),

    /// Scheduled entry point: full sync on AC power, due-only pass otherwise.
    RunOnce(RunOnceArgs),

    /// Audit mirror health, runner health, and upcoming check times.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::SetToken(args) => args.run(),
        Commands::Projects(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::RunOnce(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
