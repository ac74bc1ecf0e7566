use anyhow::Result;

use crate::config::load_config;
use crate::run::snapshot::collect_snapshots;

/// CLI command: print the snapshots held in the backup clone, per tracked
/// file, oldest first.
///
/// Tracked files are shown in configuration order, each with the number of
/// snapshots currently kept. A tracked file with no snapshots yet (or a
/// clone that has not been provisioned) is still listed, with a count of
/// zero, so the output always covers the full tracked set.
///
/// Example output:
/// ```text
/// - status.json [3 kept]
///     status_20240101_000000.json
///     status_20240102_000000.json
///     status_20240103_000000.json
/// - history.json [0 kept]
/// ```
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the backup
/// clone cannot be scanned.
pub fn cmd_list() -> Result<()> {
    let cfg = load_config()?;
    for name in &cfg.files {
        let snaps = collect_snapshots(&cfg.repo_dir, name)?;
        println!("- {} [{} kept]", name, snaps.len());
        for s in &snaps {
            println!("    {}", s);
        }
    }
    Ok(())
}
