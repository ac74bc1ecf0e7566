use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::paths;

/// Top-level configuration structure loaded from `config.toml`.
///
/// The file defines which files snapkeep protects and where their
/// timestamped snapshots are pushed.
///
/// Example TOML:
/// ```toml
/// source_dir  = "/srv/status/public"
/// files       = ["status.json", "history.json", "status-badge.json"]
/// repo_dir    = "/srv/status/status-backup"
/// repo_url    = "https://github.com/example/status-backup.git"
/// remote      = "origin"
/// branch      = "main"
/// max_backups = 30
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory containing the tracked files.
    pub source_dir: PathBuf,
    /// Tracked file names, processed in the order written.
    #[serde(default)]
    pub files: Vec<String>,
    /// Local clone of the backup repository.
    pub repo_dir: PathBuf,
    /// Clone URL, used only when `repo_dir` does not exist yet.
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Snapshots kept per tracked file; older ones are pruned.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_max_backups() -> usize {
    30
}

/// Load and parse `config.toml` into a [`Config`] structure.
///
/// # Errors
/// - Returns an error if `config.toml` cannot be read.
/// - Returns an error if parsing the TOML fails.
/// - Returns an error if `max_backups` is zero.
///
/// # Notes
/// - This always resolves the path using [`paths()`].
/// - If the file is missing, the error message includes the resolved path.
pub fn load_config() -> Result<Config> {
    let p = paths()?;
    load_config_from(&p.config)
}

/// Load configuration from an explicit path.
///
/// Split out of [`load_config`] so tests can parse configs from a
/// temporary directory without touching the real snapkeep home.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("config not found: {}", path.display()))?;
    let cfg: Config = toml::from_str(&txt).context("failed to parse config.toml")?;
    if cfg.max_backups == 0 {
        bail!("max_backups must be at least 1");
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let p = dir.join("config.toml");
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn parses_full_config() {
        let td = tempdir().unwrap();
        let p = write_config(
            td.path(),
            r#"
source_dir  = "/srv/status/public"
files       = ["status.json", "history.json"]
repo_dir    = "/srv/status/status-backup"
repo_url    = "https://github.com/example/status-backup.git"
remote      = "backup"
branch      = "master"
max_backups = 5
"#,
        );
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.source_dir, PathBuf::from("/srv/status/public"));
        assert_eq!(cfg.files, vec!["status.json", "history.json"]);
        assert_eq!(cfg.repo_dir, PathBuf::from("/srv/status/status-backup"));
        assert_eq!(
            cfg.repo_url.as_deref(),
            Some("https://github.com/example/status-backup.git")
        );
        assert_eq!(cfg.remote, "backup");
        assert_eq!(cfg.branch, "master");
        assert_eq!(cfg.max_backups, 5);
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let td = tempdir().unwrap();
        let p = write_config(
            td.path(),
            r#"
source_dir = "./public"
files      = ["status.json"]
repo_dir   = "./status-backup"
"#,
        );
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.remote, "origin");
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.max_backups, 30);
        assert!(cfg.repo_url.is_none());
    }

    #[test]
    fn zero_retention_cap_is_rejected() {
        let td = tempdir().unwrap();
        let p = write_config(
            td.path(),
            r#"
source_dir  = "./public"
files       = ["status.json"]
repo_dir    = "./status-backup"
max_backups = 0
"#,
        );
        let err = load_config_from(&p).unwrap_err();
        assert!(err.to_string().contains("max_backups"));
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let td = tempdir().unwrap();
        let missing = td.path().join("no_such_config.toml");
        let err = load_config_from(&missing).unwrap_err();
        assert!(err.to_string().contains("no_such_config.toml"));
    }
}
