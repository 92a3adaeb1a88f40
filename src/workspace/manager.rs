use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::changeset::CHANGESET_DIR;
use crate::error::Result;
use crate::platform::types::PullRequestRef;
use crate::workspace::{git, GitWorkspace};

/// The repository checked out by the workflow, authenticated with the workflow token.
pub struct LocalRepository {
    path: PathBuf,
    token: String,
}

impl LocalRepository {
    pub fn new(path: &Path, token: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl GitWorkspace for LocalRepository {
    async fn checkout_pull_request(&self, pr: &PullRequestRef) -> Result<()> {
        tracing::info!(pr = pr.number, branch = %pr.head_ref, "Checking out pull request");
        git::fetch_and_checkout(&self.path, &pr.head_ref, &self.token).await
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        git::current_branch(&self.path).await
    }

    async fn restore_changesets(&self, base_ref: &str) -> Result<()> {
        tracing::info!(base = %base_ref, "Restoring changesets from base branch");
        git::fetch_branch(&self.path, base_ref, &self.token).await?;
        git::restore_path(&self.path, &format!("origin/{base_ref}"), CHANGESET_DIR).await
    }

    async fn push_snapshot_branch(&self, branch: &str, commit_message: &str) -> Result<()> {
        git::configure_identity(&self.path, git::BOT_NAME, git::BOT_EMAIL).await?;
        git::add_all(&self.path).await?;
        git::commit(&self.path, commit_message).await?;
        git::create_branch(&self.path, branch).await?;
        git::force_push(&self.path, branch, &self.token).await?;

        tracing::info!(branch = %branch, "Pushed snapshot branch");
        Ok(())
    }
}
