use anyhow::{Context, Result};
use git2::{
    Commit, Cred, ErrorCode, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks,
    Repository, Signature, build::RepoBuilder,
};
use std::path::Path;

use super::{CommitOutcome, Vcs};

/// Production [`Vcs`] backend built on the `git2` crate.
pub struct Git2Backend;

/// Build `RemoteCallbacks` with SSH-agent credentials enabled.
///
/// This allows git operations to authenticate using the user's SSH agent.
/// If no SSH key is found, it falls back to default credentials (which is
/// also the path taken for HTTPS and local-path remotes).
fn remote_callbacks() -> RemoteCallbacks<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });
    cb
}

fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(remote_callbacks());
    fo
}

fn push_opts_with_creds() -> PushOptions<'static> {
    let mut po = PushOptions::new();
    po.remote_callbacks(remote_callbacks());
    po
}

/// Resolve the signature used for backup commits.
///
/// Prefers the repository/user configuration; falls back to a fixed
/// identity so headless runs (cron) on hosts without a configured git
/// identity still commit.
fn commit_signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(sig) => Ok(sig),
        Err(_) => Signature::now("snapkeep", "snapkeep@localhost").map_err(Into::into),
    }
}

impl Vcs for Git2Backend {
    /// Clone a repository from the given URL.
    ///
    /// # Errors
    /// Returns an error if the clone fails (bad URL, network, auth).
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts_with_creds());

        builder
            .clone(url, dest)
            .with_context(|| format!("git clone {}", url))?;
        Ok(())
    }

    /// Stage all changes in the working tree.
    ///
    /// `add_all` picks up new and modified paths; `update_all` refreshes
    /// already-tracked paths so deletions are staged as well.
    ///
    /// # Errors
    /// Returns an error if the repository cannot be opened or the index
    /// cannot be written.
    fn add_all(&self, workdir: &Path) -> Result<()> {
        let repo = Repository::open(workdir)
            .with_context(|| format!("not a git repository: {}", workdir.display()))?;
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write().context("git add .")?;
        Ok(())
    }

    /// Commit the staged tree onto the current branch.
    ///
    /// Returns [`CommitOutcome::NothingToCommit`] when the staged tree is
    /// identical to HEAD's tree (or when the repository is unborn and the
    /// index is empty), mirroring `git commit` refusing an empty commit.
    ///
    /// # Errors
    /// Returns an error if the index cannot be read or the commit cannot be
    /// written.
    fn commit(&self, workdir: &Path, message: &str) -> Result<CommitOutcome> {
        let repo = Repository::open(workdir)
            .with_context(|| format!("not a git repository: {}", workdir.display()))?;
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(p) = &parent
            && p.tree_id() == tree_id
        {
            return Ok(CommitOutcome::NothingToCommit);
        }
        if parent.is_none() && tree.len() == 0 {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let sig = commit_signature(&repo)?;
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .context("git commit")?;
        Ok(CommitOutcome::Committed)
    }

    /// Push the given branch to the named remote.
    ///
    /// # Errors
    /// Returns an error if the remote is not configured, the branch does not
    /// exist locally, or the push is rejected.
    fn push(&self, workdir: &Path, remote: &str, branch: &str) -> Result<()> {
        let repo = Repository::open(workdir)
            .with_context(|| format!("not a git repository: {}", workdir.display()))?;
        let mut rem = repo
            .find_remote(remote)
            .with_context(|| format!("remote not configured: {}", remote))?;

        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        rem.push(&[refspec.as_str()], Some(&mut push_opts_with_creds()))
            .with_context(|| format!("git push {} {}", remote, branch))?;
        Ok(())
    }
}
