mod progress;
mod provision;
mod prune;
mod publish;
pub(crate) mod snapshot;

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar};
use std::io::{self, Write};
use std::time::Duration;

use crate::config::{Config, load_config};
use crate::git::{CommitOutcome, Git2Backend, Vcs};

use progress::{err_style, ok_style, spinner_style};

/// Run the backup pipeline for the tracked files in `config.toml`.
///
/// High-level flow:
/// 1. Make sure the backup clone exists, cloning it on first run
///    (see [`provision`]). If no `repo_url` is configured and the clone is
///    missing, the URL is read from stdin here, before any stage logic runs.
/// 2. Copy each tracked file into the clone under a name carrying this
///    run's timestamp (see [`snapshot`]). Missing source files are skipped
///    with a notice.
/// 3. Prune the oldest snapshots of each tracked file beyond `max_backups`
///    (see [`prune`]).
/// 4. Stage, commit, and push the clone (see [`publish`]). A run where
///    nothing changed still pushes, but records no commit.
///
/// The stages run strictly in this order; the first fatal error ends the
/// run and leaves the clone in whatever state the completed steps produced.
/// A later run reconciles that state, since every stage re-derives its
/// input from the filesystem.
///
/// Progress reporting uses `indicatif::MultiProgress`; copies and removals
/// each get their own spinner line.
pub fn cmd_run() -> Result<()> {
    let cfg = load_config()?;
    if cfg.files.is_empty() {
        eprintln!("no tracked files in config");
        return Ok(());
    }

    let url = match (&cfg.repo_url, cfg.repo_dir.exists()) {
        (Some(u), _) => Some(u.clone()),
        (None, true) => None,
        (None, false) => Some(prompt_repo_url()?),
    };

    run_pipeline(&cfg, &Git2Backend, url.as_deref())
}

/// Interactive fallback asking for the backup repository URL.
///
/// Only reached from [`cmd_run`] when the clone is missing and the config
/// carries no `repo_url`; stage functions never touch stdin.
fn prompt_repo_url() -> Result<String> {
    print!("Enter the URL of the backup repo: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read repo URL")?;
    Ok(line.trim().to_string())
}

/// Execute provision → copy → prune → publish against the given [`Vcs`].
///
/// Split from [`cmd_run`] so tests can drive the whole pipeline with a
/// fake backend and a throwaway config.
fn run_pipeline(cfg: &Config, vcs: &dyn Vcs, repo_url: Option<&str>) -> Result<()> {
    provision::ensure_cloned(vcs, &cfg.repo_dir, repo_url)?;

    let mp = MultiProgress::new();

    let stamp = snapshot::run_stamp();
    snapshot::copy_snapshots(&mp, &cfg.files, &cfg.source_dir, &cfg.repo_dir, &stamp)?;
    prune::prune_old_snapshots(&mp, &cfg.files, &cfg.repo_dir, cfg.max_backups)?;

    let pb = mp.add(ProgressBar::new_spinner());
    pb.set_style(spinner_style());
    pb.set_message(format!("publishing to {}/{}", cfg.remote, cfg.branch));
    pb.enable_steady_tick(Duration::from_millis(80));

    match publish::publish(vcs, &cfg.repo_dir, &cfg.remote, &cfg.branch) {
        Ok(CommitOutcome::Committed) => {
            pb.set_style(ok_style());
            pb.finish_with_message(format!("backup pushed to {}/{}", cfg.remote, cfg.branch));
            Ok(())
        }
        Ok(CommitOutcome::NothingToCommit) => {
            pb.set_style(ok_style());
            pb.finish_with_message(format!(
                "no new changes; pushed {}/{}",
                cfg.remote, cfg.branch
            ));
            Ok(())
        }
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("publish failed: {}", e));
            Err(e)
        }
    }
}
