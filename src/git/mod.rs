//! Git integration layer.
//!
//! This module defines the narrow [`Vcs`] interface the backup pipeline
//! depends on and re-exports the production backend (`git2_backend`).
//!
//! The idea is to hide internal implementation details (currently based on
//! the `git2` crate) so that future backends or alternative implementations
//! could be swapped in without affecting the rest of the codebase. Tests
//! substitute an in-memory fake instead of touching a real repository.

mod git2_backend;

pub use git2_backend::Git2Backend;

use anyhow::Result;
use std::path::Path;

/// Result of a commit attempt.
///
/// Committing with a clean index is an expected situation (a run where no
/// tracked file changed), so it is reported as an outcome rather than an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created on the current branch.
    Committed,
    /// The staged tree matched HEAD; no commit was created.
    NothingToCommit,
}

/// The version-control operations the backup pipeline needs.
///
/// Every operation blocks until it completes and reports failure through
/// the returned `Result`; callers treat any `Err` as fatal for the run.
pub trait Vcs {
    /// Clone `url` into `dest`, which must not exist yet.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
    /// Stage every change under `workdir`, including new and deleted paths.
    fn add_all(&self, workdir: &Path) -> Result<()>;
    /// Commit the staged tree with `message`.
    fn commit(&self, workdir: &Path, message: &str) -> Result<CommitOutcome>;
    /// Push `branch` to the named `remote`.
    fn push(&self, workdir: &Path, remote: &str, branch: &str) -> Result<()>;
}
