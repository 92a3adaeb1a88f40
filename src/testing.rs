//! In-memory stand-ins for the GitHub API, subprocesses and git.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::platform::types::{ActorPermission, PullRequestRef, Reaction};
use crate::platform::Platform;
use crate::runner::{CommandRunner, CommandSpec, CommandStatus};
use crate::workspace::GitWorkspace;

pub struct FakePlatform {
    permission: ActorPermission,
    pull_request: PullRequestRef,
    calls: Mutex<Vec<String>>,
    comments: Mutex<Vec<String>>,
    reactions: Mutex<Vec<Reaction>>,
}

impl FakePlatform {
    pub fn new(permission: ActorPermission) -> Self {
        Self {
            permission,
            pull_request: PullRequestRef {
                number: 42,
                head_repo_full_name: Some("acme/ui".to_string()),
                head_ref: "feature/dark-mode".to_string(),
                base_ref: "main".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_head_repo(mut self, full_name: Option<&str>) -> Self {
        self.pull_request.head_repo_full_name = full_name.map(str::to_string);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.comments.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<Reaction> {
        self.reactions.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn add_reaction(
        &self,
        _repo_full_name: &str,
        comment_id: u64,
        reaction: Reaction,
    ) -> Result<()> {
        self.record(format!("add_reaction {comment_id} {}", reaction.content()));
        self.reactions.lock().unwrap().push(reaction);
        Ok(())
    }

    async fn post_comment(
        &self,
        _repo_full_name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()> {
        self.record(format!("post_comment {issue_number}"));
        self.comments.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn get_permission(
        &self,
        _repo_full_name: &str,
        username: &str,
    ) -> Result<ActorPermission> {
        self.record(format!("get_permission {username}"));
        Ok(self.permission)
    }

    async fn get_pull_request(
        &self,
        _repo_full_name: &str,
        pr_number: u64,
    ) -> Result<PullRequestRef> {
        self.record(format!("get_pull_request {pr_number}"));
        Ok(self.pull_request.clone())
    }
}

/// Records commands instead of running them. Commands listed in `fail_on` exit 1.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    fail_on: Vec<String>,
}

impl FakeRunner {
    pub fn fail_on(mut self, command: &str) -> Self {
        self.fail_on.push(command.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        let rendered = command.to_string();
        self.calls.lock().unwrap().push(rendered.clone());
        let code = if self.fail_on.contains(&rendered) { 1 } else { 0 };
        Ok(CommandStatus { code: Some(code) })
    }
}

#[derive(Default)]
pub struct FakeGit {
    branch: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn on_branch(branch: &str) -> Self {
        Self {
            branch: Some(branch.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitWorkspace for FakeGit {
    async fn checkout_pull_request(&self, pr: &PullRequestRef) -> Result<()> {
        self.record(format!("checkout {}", pr.head_ref));
        Ok(())
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        self.record("current_branch".to_string());
        Ok(self.branch.clone())
    }

    async fn restore_changesets(&self, base_ref: &str) -> Result<()> {
        self.record(format!("restore {base_ref}"));
        Ok(())
    }

    async fn push_snapshot_branch(&self, branch: &str, commit_message: &str) -> Result<()> {
        self.record(format!("push {branch}: {commit_message}"));
        Ok(())
    }
}
