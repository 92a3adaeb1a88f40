use async_trait::async_trait;
use octocrab::Octocrab;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::mapper;

/// GitHub REST client authenticated with the workflow token.
pub struct GitHubPlatform {
    client: Octocrab,
}

impl GitHubPlatform {
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;
        Ok(Self { client })
    }

    /// Point the client at a different API root (GitHub Enterprise, tests).
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .map_err(|e| AppError::GitHubApi(format!("Invalid API base URI {base_uri}: {e}")))?
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;
        Ok(Self { client })
    }

    fn parse_repo(repo_full_name: &str) -> Result<(&str, &str)> {
        let parts: Vec<&str> = repo_full_name.splitn(2, '/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(AppError::GitHubApi(format!(
                "Invalid repo name: {repo_full_name}"
            )));
        }
        Ok((parts[0], parts[1]))
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn add_reaction(
        &self,
        repo_full_name: &str,
        comment_id: u64,
        reaction: Reaction,
    ) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        let url = format!("/repos/{owner}/{repo}/issues/comments/{comment_id}/reactions");
        let _: serde_json::Value = self
            .client
            .post(
                &url,
                Some(&serde_json::json!({ "content": reaction.content() })),
            )
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to add reaction: {e}")))?;

        Ok(())
    }

    async fn post_comment(
        &self,
        repo_full_name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        self.client
            .issues(owner, repo)
            .create_comment(issue_number, body)
            .await?;

        Ok(())
    }

    async fn get_permission(
        &self,
        repo_full_name: &str,
        username: &str,
    ) -> Result<ActorPermission> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        let url = format!(
            "/repos/{owner}/{repo}/collaborators/{}/permission",
            urlencoding::encode(username)
        );
        let response: serde_json::Value = self
            .client
            .get(&url, None::<&()>)
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to fetch permission: {e}")))?;

        Ok(mapper::map_permission(&response))
    }

    async fn get_pull_request(
        &self,
        repo_full_name: &str,
        pr_number: u64,
    ) -> Result<PullRequestRef> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        let pr = self.client.pulls(owner, repo).get(pr_number).await?;

        Ok(mapper::map_pull_request(pr))
    }
}
