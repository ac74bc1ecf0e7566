//! # snapkeep
//!
//! **snapkeep** backs up a fixed set of JSON files into a git repository.
//!
//! Features:
//! - Tracked files defined in `$(snapkeep home)/config.toml`
//! - `snapkeep run` copies each tracked file into the backup clone under a
//!   timestamped name, prunes old snapshots beyond the retention cap, and
//!   commits/pushes the result
//! - `snapkeep list` shows the snapshots currently held per tracked file
//! - `snapkeep home` prints the snapkeep home directory
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, Subcommand};
use snapkeep::{cmd_list, cmd_run, snapkeep_home};

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "snapkeep",
    version,
    about = "snapkeep - timestamped JSON backups pushed to a git remote",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

/// Available subcommands.
///
/// Each variant corresponds to a subcommand of `snapkeep`.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Copy, prune, and push the tracked files defined in config.toml
    Run,
    /// Show snapshots held in the backup clone, per tracked file
    List,
    /// Print the snapkeep home directory
    Home,
}

/// CLI entry point.
///
/// Parses arguments with `clap` and executes the selected subcommand.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap();

    match cmd {
        Cmd::Run => cmd_run(),
        Cmd::List => cmd_list(),
        Cmd::Home => {
            println!("{}", snapkeep_home()?.display());
            Ok(())
        }
    }
}
