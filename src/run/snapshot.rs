use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{MultiProgress, ProgressBar};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use super::progress::{err_style, ok_style, spinner_style, warn_style};

/// Produce the timestamp suffix shared by every snapshot of one run.
///
/// The format is fixed-width and zero-padded (`YYYYMMDD_HHMMSS`, local
/// clock), so lexicographic order of snapshot names equals chronological
/// order. All snapshots created in one run carry the same stamp, which lets
/// a run be identified as a unit in the backup clone.
pub fn run_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Derive the snapshot name for a tracked file and a run stamp.
///
/// `status.json` + `20240103_120000` → `status_20240103_120000.json`.
pub fn snapshot_name(file_name: &str, stamp: &str) -> String {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    format!("{}_{}.json", stem, stamp)
}

/// Build the pattern matching every snapshot of one tracked file.
///
/// The stem is escaped so tracked files with regex metacharacters in their
/// names (`status-badge.json`) only match their own snapshots.
pub fn snapshot_pattern(file_name: &str) -> Regex {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    let mut s = String::from("^");
    s.push_str(&regex::escape(stem));
    s.push_str("_\\d{8}_\\d{6}\\.json$");
    Regex::new(&s).unwrap()
}

/// Collect the snapshot names held for one tracked file, sorted ascending
/// (oldest first).
///
/// # Errors
/// Returns an error if the directory cannot be read for reasons other than
/// `NotFound`. If the directory does not exist, returns an empty list.
pub fn collect_snapshots(repo_dir: &Path, file_name: &str) -> Result<Vec<String>> {
    let re = snapshot_pattern(file_name);

    let rd = match fs::read_dir(repo_dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("read dir {}", repo_dir.display()));
        }
    };

    let mut names: Vec<String> = rd
        .flatten()
        .filter_map(|ent| ent.file_name().into_string().ok())
        .filter(|name| re.is_match(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Copy each tracked file into the backup clone under its timestamped name.
///
/// A tracked file missing from `source_dir` is reported and skipped; the
/// remaining files are still processed. Any other copy failure aborts the
/// run.
///
/// # Returns
/// The number of snapshots written.
pub fn copy_snapshots(
    mp: &MultiProgress,
    files: &[String],
    source_dir: &Path,
    repo_dir: &Path,
    stamp: &str,
) -> Result<usize> {
    let mut copied = 0;

    for name in files {
        let src = source_dir.join(name);
        let dst_name = snapshot_name(name, stamp);
        let dst = repo_dir.join(&dst_name);

        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(spinner_style());
        pb.set_message(format!("copying {}", name));
        pb.enable_steady_tick(Duration::from_millis(80));

        if !src.exists() {
            pb.set_style(warn_style());
            pb.finish_with_message(format!("{} not found, skipping", src.display()));
            continue;
        }

        match fs::copy(&src, &dst) {
            Ok(_) => {
                pb.set_style(ok_style());
                pb.finish_with_message(format!("copied {} -> {}", name, dst_name));
                copied += 1;
            }
            Err(e) => {
                pb.set_style(err_style());
                pb.finish_with_message(format!("copy {} (error: {})", name, e));
                return Err(e)
                    .with_context(|| format!("copy {} -> {}", src.display(), dst.display()));
            }
        }
    }

    Ok(copied)
}
