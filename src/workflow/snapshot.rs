use crate::changeset;
use crate::config::RunConfiguration;
use crate::error::{AppError, Result};
use crate::packages::{self, PackageManager};
use crate::platform::types::{PullRequestRef, Reaction};
use crate::platform::Platform;
use crate::report;
use crate::runner::{run_checked, run_script, CommandRunner};
use crate::snapshot::{collect_snapshots, require_snapshots, Snapshot};
use crate::webhook::CommandEvent;
use crate::workflow::trigger;
use crate::workflow::types::WorkflowOutcome;
use crate::workspace::GitWorkspace;

/// Commit message for branch mode: issue title followed by the snapshot tag.
pub fn commit_message(issue_title: &str, snapshot: &Snapshot) -> String {
    format!("{issue_title} {}", snapshot.tag())
}

/// One comment-triggered snapshot release, from trigger check to report.
pub struct SnapshotWorkflow<'a> {
    config: &'a RunConfiguration,
    platform: &'a dyn Platform,
    runner: &'a dyn CommandRunner,
    git: &'a dyn GitWorkspace,
}

impl<'a> SnapshotWorkflow<'a> {
    pub fn new(
        config: &'a RunConfiguration,
        platform: &'a dyn Platform,
        runner: &'a dyn CommandRunner,
        git: &'a dyn GitWorkspace,
    ) -> Self {
        Self {
            config,
            platform,
            runner,
            git,
        }
    }

    pub async fn run(&self, event: &CommandEvent) -> Result<WorkflowOutcome> {
        if !trigger::is_command(&self.config.comment_commands, &event.comment_body) {
            tracing::debug!(
                repo = %event.repository_full_name,
                issue = event.issue_number,
                "Comment is not a snapit command, ignoring"
            );
            return Ok(WorkflowOutcome::Ignored);
        }

        if !event.is_pull_request {
            tracing::info!(
                repo = %event.repository_full_name,
                issue = event.issue_number,
                "Command posted on an issue, not a pull request, ignoring"
            );
            return Ok(WorkflowOutcome::Ignored);
        }

        tracing::info!(
            repo = %event.repository_full_name,
            issue = event.issue_number,
            author = %event.comment_author,
            "Snapshot release requested"
        );

        match self.execute(event).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(reaction_err) = self
                    .platform
                    .add_reaction(&event.repository_full_name, event.comment_id, Reaction::Confused)
                    .await
                {
                    tracing::warn!(error = %reaction_err, "Failed to add failure reaction");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, event: &CommandEvent) -> Result<WorkflowOutcome> {
        let repo = &event.repository_full_name;

        self.platform
            .add_reaction(repo, event.comment_id, Reaction::Eyes)
            .await?;

        let pr = self.authorize(event).await?;
        let package_manager = self.prepare_workspace(&pr).await?;
        let snapshots = self.version_and_build().await?;
        let body = report::success_comment(
            self.config,
            &event.comment_author,
            &snapshots,
            package_manager,
        );

        let outcome = self.publish(event, snapshots).await?;

        self.platform
            .post_comment(repo, event.issue_number, &body)
            .await?;
        self.platform
            .add_reaction(repo, event.comment_id, Reaction::Rocket)
            .await?;

        Ok(outcome)
    }

    /// Permission check, then fork check. Both post a comment before failing.
    async fn authorize(&self, event: &CommandEvent) -> Result<PullRequestRef> {
        let repo = &event.repository_full_name;

        let permission = self
            .platform
            .get_permission(repo, &event.comment_author)
            .await?;
        if !permission.is_sufficient() {
            tracing::warn!(
                author = %event.comment_author,
                permission = %permission,
                "Insufficient permission"
            );
            self.platform
                .post_comment(repo, event.issue_number, report::PERMISSION_DENIED_MESSAGE)
                .await?;
            return Err(AppError::Authorization(
                report::PERMISSION_DENIED_MESSAGE.to_string(),
            ));
        }

        let pr = self
            .platform
            .get_pull_request(repo, event.issue_number)
            .await?;
        if pr.is_from_fork(repo) {
            tracing::warn!(
                head_repo = ?pr.head_repo_full_name,
                "Pull request comes from a fork"
            );
            self.platform
                .post_comment(repo, event.issue_number, report::FORK_UNSUPPORTED_MESSAGE)
                .await?;
            return Err(AppError::UnsupportedOperation(
                report::FORK_UNSUPPORTED_MESSAGE.to_string(),
            ));
        }

        Ok(pr)
    }

    async fn prepare_workspace(&self, pr: &PullRequestRef) -> Result<PackageManager> {
        self.git.checkout_pull_request(pr).await?;

        // The release branch has already consumed its changesets; bring them
        // back so the snapshot versions are computed from scratch.
        let branch = self.git.current_branch().await?;
        if branch.as_deref() == Some(self.config.release_branch.as_str()) {
            self.git.restore_changesets(&pr.base_ref).await?;
        }

        let package_manager = PackageManager::detect(&self.config.working_directory);
        tracing::info!(package_manager = ?package_manager, "Installing dependencies");
        run_checked(self.runner, &package_manager.install_command()).await?;

        if let Some(script) = &self.config.post_install_script {
            run_script(self.runner, script).await?;
        }

        Ok(package_manager)
    }

    async fn version_and_build(&self) -> Result<Vec<Snapshot>> {
        changeset::version_snapshot(self.runner).await?;

        let manifests = packages::scan_workspace(&self.config.working_directory).await?;
        let snapshots = require_snapshots(collect_snapshots(&manifests))?;
        let identifiers: Vec<&str> = snapshots.iter().map(|s| s.full_identifier.as_str()).collect();
        tracing::info!(snapshots = ?identifiers, "Snapshot versions created");

        if let Some(script) = &self.config.build_script {
            run_script(self.runner, script).await?;
        }

        Ok(snapshots)
    }

    async fn publish(
        &self,
        event: &CommandEvent,
        snapshots: Vec<Snapshot>,
    ) -> Result<WorkflowOutcome> {
        if let Some(branch) = &self.config.branch {
            let message = commit_message(&event.issue_title, &snapshots[0]);
            self.git.push_snapshot_branch(branch, &message).await?;
            return Ok(WorkflowOutcome::PushedToBranch {
                branch: branch.clone(),
                snapshots,
            });
        }

        let token = self.config.npm_token.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "Please provide the NPM_TOKEN to the snapit GitHub action".to_string(),
            )
        })?;
        let home = self.config.home_dir.as_deref().ok_or_else(|| {
            AppError::Configuration("HOME is not set; cannot write .npmrc".to_string())
        })?;
        changeset::write_npmrc(home, token).await?;
        changeset::publish_snapshot(self.runner).await?;

        Ok(WorkflowOutcome::Published { snapshots })
    }
}
