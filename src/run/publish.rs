use anyhow::Result;
use chrono::Local;
use std::path::Path;

use crate::git::{CommitOutcome, Vcs};

/// Stage, commit, and push the backup clone.
///
/// The commit message embeds a full RFC 3339 timestamp, deliberately
/// distinct from the compact stamp used in snapshot filenames. A commit
/// attempt that finds nothing staged is reported as
/// [`CommitOutcome::NothingToCommit`] and does not abort; the push still
/// happens, since local commits from an earlier interrupted run may not
/// have reached the remote yet.
///
/// # Errors
/// Returns an error if staging, committing, or pushing fails.
pub fn publish(
    vcs: &dyn Vcs,
    repo_dir: &Path,
    remote: &str,
    branch: &str,
) -> Result<CommitOutcome> {
    vcs.add_all(repo_dir)?;
    let message = format!("Backup: {}", Local::now().to_rfc3339());
    let outcome = vcs.commit(repo_dir, &message)?;
    vcs.push(repo_dir, remote, branch)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::FakeVcs;
    use std::path::PathBuf;

    fn repo() -> PathBuf {
        PathBuf::from("/tmp/does-not-matter")
    }

    #[test]
    fn stages_commits_and_pushes_in_order() {
        let vcs = FakeVcs::new();
        let out = publish(&vcs, &repo(), "origin", "main").unwrap();
        assert_eq!(out, CommitOutcome::Committed);

        let calls = vcs.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], "add_all");
        assert!(calls[1].starts_with("commit Backup: "));
        assert_eq!(calls[2], "push origin main");
    }

    #[test]
    fn nothing_to_commit_still_pushes() {
        let mut vcs = FakeVcs::new();
        vcs.commit_outcome = CommitOutcome::NothingToCommit;
        let out = publish(&vcs, &repo(), "origin", "main").unwrap();
        assert_eq!(out, CommitOutcome::NothingToCommit);
        assert_eq!(vcs.calls.borrow().last().unwrap(), "push origin main");
    }

    #[test]
    fn push_failure_propagates() {
        let mut vcs = FakeVcs::new();
        vcs.fail_push = true;
        let res = publish(&vcs, &repo(), "origin", "main");
        assert!(res.is_err());
    }

    #[test]
    fn commit_failure_stops_before_push() {
        let mut vcs = FakeVcs::new();
        vcs.fail_commit = true;
        let res = publish(&vcs, &repo(), "origin", "main");
        assert!(res.is_err());
        assert!(
            !vcs.calls
                .borrow()
                .iter()
                .any(|c| c.starts_with("push"))
        );
    }
}
