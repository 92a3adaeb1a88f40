//! Invocations of the `changeset` CLI and registry credentials.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::runner::{run_checked, CommandRunner, CommandSpec};
use crate::snapshot::SNAPSHOT_TAG;

/// Directory holding pending change descriptors.
pub const CHANGESET_DIR: &str = ".changeset";

const NPM_REGISTRY: &str = "//registry.npmjs.org/";

pub fn version_command() -> CommandSpec {
    CommandSpec::new("npx", &["changeset", "version", "--snapshot", SNAPSHOT_TAG])
}

pub fn publish_command() -> CommandSpec {
    CommandSpec::new(
        "npx",
        &[
            "changeset",
            "publish",
            "--no-git-tags",
            "--snapshot",
            "--tag",
            SNAPSHOT_TAG,
        ],
    )
}

/// Bump every package with a pending changeset to a snapshot version.
pub async fn version_snapshot(runner: &dyn CommandRunner) -> Result<()> {
    run_checked(runner, &version_command()).await
}

/// Publish snapshot versions without creating git tags.
pub async fn publish_snapshot(runner: &dyn CommandRunner) -> Result<()> {
    run_checked(runner, &publish_command()).await
}

/// Write `~/.npmrc` with the registry auth token.
pub async fn write_npmrc(home_dir: &Path, token: &str) -> Result<()> {
    let path = home_dir.join(".npmrc");
    tokio::fs::write(&path, format!("{NPM_REGISTRY}:_authToken={token}\n"))
        .await
        .map_err(|e| {
            AppError::Configuration(format!("Failed to write {}: {e}", path.display()))
        })?;
    tracing::debug!(path = %path.display(), "Wrote registry credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(
            version_command().to_string(),
            "npx changeset version --snapshot snapshot"
        );
        assert_eq!(
            publish_command().to_string(),
            "npx changeset publish --no-git-tags --snapshot --tag snapshot"
        );
    }

    #[tokio::test]
    async fn test_write_npmrc() {
        let tmp = tempfile::tempdir().unwrap();
        write_npmrc(tmp.path(), "npm_abc").await.unwrap();
        let contents = std::fs::read_to_string(tmp.path().join(".npmrc")).unwrap();
        assert_eq!(contents, "//registry.npmjs.org/:_authToken=npm_abc\n");
    }
}
