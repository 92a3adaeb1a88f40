pub mod git;
mod manager;

use async_trait::async_trait;

use crate::error::Result;
use crate::platform::types::PullRequestRef;

pub use manager::LocalRepository;

/// Git operations the pipeline performs on the checked-out repository.
#[async_trait]
pub trait GitWorkspace: Send + Sync {
    /// Check out the pull request's head branch.
    async fn checkout_pull_request(&self, pr: &PullRequestRef) -> Result<()>;

    /// Name of the checked-out branch, `None` when HEAD is detached.
    async fn current_branch(&self) -> Result<Option<String>>;

    /// Restore the changeset directory from the base branch.
    async fn restore_changesets(&self, base_ref: &str) -> Result<()>;

    /// Commit every change, move it to `branch` and force-push that branch.
    async fn push_snapshot_branch(&self, branch: &str, commit_message: &str) -> Result<()>;
}
