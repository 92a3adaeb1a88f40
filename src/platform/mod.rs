pub mod github;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Add a reaction to an issue comment.
    async fn add_reaction(
        &self,
        repo_full_name: &str,
        comment_id: u64,
        reaction: Reaction,
    ) -> Result<()>;

    /// Post a comment on an issue or PR.
    async fn post_comment(
        &self,
        repo_full_name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()>;

    /// Look up a user's permission level on the repository.
    async fn get_permission(&self, repo_full_name: &str, username: &str)
        -> Result<ActorPermission>;

    /// Fetch a pull request.
    async fn get_pull_request(&self, repo_full_name: &str, pr_number: u64)
        -> Result<PullRequestRef>;
}
