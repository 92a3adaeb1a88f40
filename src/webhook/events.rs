use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// `issue_comment` payload as written to `GITHUB_EVENT_PATH` by the runner.
///
/// Every section is optional so that a missing one surfaces as a
/// configuration error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct IssueCommentEvent {
    pub issue: Option<IssuePayload>,
    pub comment: Option<CommentPayload>,
    pub repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub pull_request: Option<serde_json::Value>, // Present if issue is a PR
}

impl IssuePayload {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub id: u64,
    pub body: Option<String>,
    pub user: UserPayload,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub login: String,
}

/// The comment that triggered this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub comment_id: u64,
    pub comment_body: String,
    pub comment_author: String,
    pub issue_number: u64,
    pub issue_title: String,
    pub is_pull_request: bool,
    pub repository_full_name: String,
}

impl CommandEvent {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let event: IssueCommentEvent = serde_json::from_slice(payload)?;
        Self::try_from(event)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let payload = tokio::fs::read(path).await.map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read event payload at {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&payload)
    }
}

impl TryFrom<IssueCommentEvent> for CommandEvent {
    type Error = AppError;

    fn try_from(event: IssueCommentEvent) -> Result<Self> {
        let (Some(comment), Some(issue), Some(repository)) =
            (event.comment, event.issue, event.repository)
        else {
            return Err(AppError::Configuration(
                "No comment, repository, or issue found in the payload".to_string(),
            ));
        };

        Ok(Self {
            is_pull_request: issue.is_pull_request(),
            comment_id: comment.id,
            comment_body: comment.body.unwrap_or_default(),
            comment_author: comment.user.login,
            issue_number: issue.number,
            issue_title: issue.title,
            repository_full_name: repository.full_name,
        })
    }
}
