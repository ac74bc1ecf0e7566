use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use super::progress::{err_style, ok_style, spinner_style, warn_style};
use super::snapshot::collect_snapshots;

/// Delete the oldest snapshots of each tracked file beyond the retention cap.
///
/// Snapshot names carry a fixed-width timestamp, so sorting them ascending
/// puts the chronologically oldest first; when a tracked file holds more
/// than `max_backups` snapshots, the first `count - max_backups` names are
/// removed. Each removal is shown on its own progress line.
///
/// A removal hitting `NotFound` is treated as success (the snapshot is
/// already gone, e.g. removed by a concurrent run); any other removal error
/// aborts the run.
///
/// # Arguments
/// - `mp`: `MultiProgress` instance for rendering multiple progress bars.
/// - `files`: Tracked file names from the configuration.
/// - `repo_dir`: Path to the backup clone.
/// - `max_backups`: Snapshots to keep per tracked file.
///
/// # Errors
/// Returns `Err` if the backup clone cannot be scanned or a removal fails
/// for reasons other than "not found".
pub fn prune_old_snapshots(
    mp: &MultiProgress,
    files: &[String],
    repo_dir: &Path,
    max_backups: usize,
) -> Result<()> {
    for name in files {
        let snaps = collect_snapshots(repo_dir, name)?;
        if snaps.len() <= max_backups {
            continue;
        }

        let excess = snaps.len() - max_backups;
        for victim in snaps.into_iter().take(excess) {
            let pb = mp.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style());
            pb.set_message(format!("removing old snapshot: {}", victim));
            pb.enable_steady_tick(Duration::from_millis(80));

            match fs::remove_file(repo_dir.join(&victim)) {
                Ok(_) => {
                    pb.set_style(ok_style());
                    pb.finish_with_message(format!("removed old snapshot: {}", victim));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    pb.set_style(warn_style());
                    pb.finish_with_message(format!("already removed: {}", victim));
                }
                Err(e) => {
                    pb.set_style(err_style());
                    pb.finish_with_message(format!("remove {} (error: {})", victim, e));
                    return Err(e).with_context(|| format!("remove old snapshot {}", victim));
                }
            }
        }
    }
    Ok(())
}
