use anyhow::{Context, Result};
use std::path::Path;

use crate::git::Vcs;

/// Make sure a backup clone exists at `repo_dir`.
///
/// An existing directory is taken at face value; no check is made that it
/// is actually a clone of the configured remote. When the directory is
/// missing, the repository is cloned from `repo_url`.
///
/// # Errors
/// - Returns an error if the directory is missing and no URL was supplied.
/// - Returns an error if the clone fails.
pub fn ensure_cloned(vcs: &dyn Vcs, repo_dir: &Path, repo_url: Option<&str>) -> Result<()> {
    if repo_dir.exists() {
        return Ok(());
    }
    let url = repo_url.context("backup clone is missing and no repo_url is configured")?;
    vcs.clone_repo(url, repo_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::FakeVcs;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn existing_directory_is_a_noop() {
        let td = tempdir().unwrap();
        let repo = td.path().join("backup");
        fs::create_dir_all(&repo).unwrap();

        let vcs = FakeVcs::new();
        ensure_cloned(&vcs, &repo, None).unwrap();
        assert!(vcs.calls.borrow().is_empty());
    }

    #[test]
    fn missing_directory_triggers_a_clone() {
        let td = tempdir().unwrap();
        let repo = td.path().join("backup");

        let vcs = FakeVcs::new();
        ensure_cloned(&vcs, &repo, Some("https://example.invalid/backup.git")).unwrap();
        assert_eq!(
            vcs.calls.borrow().as_slice(),
            ["clone https://example.invalid/backup.git"]
        );
        assert!(repo.exists());
    }

    #[test]
    fn missing_directory_without_url_is_an_error() {
        let td = tempdir().unwrap();
        let repo = td.path().join("backup");

        let vcs = FakeVcs::new();
        let err = ensure_cloned(&vcs, &repo, None).unwrap_err();
        assert!(err.to_string().contains("repo_url"));
        assert!(vcs.calls.borrow().is_empty());
    }

    #[test]
    fn clone_failure_propagates() {
        let td = tempdir().unwrap();
        let repo = td.path().join("backup");

        let mut vcs = FakeVcs::new();
        vcs.fail_clone = true;
        let res = ensure_cloned(&vcs, &repo, Some("https://example.invalid/x.git"));
        assert!(res.is_err());
        assert!(!repo.exists());
    }
}
