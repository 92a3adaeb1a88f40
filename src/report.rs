//! Markdown bodies for the comments posted back to the pull request.

use crate::config::RunConfiguration;
use crate::packages::PackageManager;
use crate::snapshot::Snapshot;

pub const PERMISSION_DENIED_MESSAGE: &str =
    "Only users with write permission to the repository can run /snapit";

pub const FORK_UNSUPPORTED_MESSAGE: &str =
    "`/snapit` is not supported on pull requests from forked repositories.";

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Keep only the packages named in the allow-list, if one is configured.
pub fn filter_included<'a>(
    snapshots: &'a [Snapshot],
    included: Option<&[String]>,
) -> Vec<&'a Snapshot> {
    snapshots
        .iter()
        .filter(|s| included.map_or(true, |names| names.contains(&s.package_name)))
        .collect()
}

fn global_install_block(snapshots: &[&Snapshot], package_manager: PackageManager) -> String {
    let lines = snapshots
        .iter()
        .map(|s| format!("{} {}", package_manager.global_add(), s.full_identifier))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Test the snapshot{} by running:\n```sh\n{lines}\n```",
        plural(snapshots.len())
    )
}

fn dependency_block(snapshots: &[&Snapshot]) -> String {
    let lines = snapshots
        .iter()
        .map(|s| format!("\"{}\": \"{}\"", s.package_name, s.version))
        .collect::<Vec<_>>()
        .join(",\n");
    let s = plural(snapshots.len());
    format!(
        "Test the snapshot{s} by updating your `package.json` with the newly published version{s}:\n```json\n{lines}\n```"
    )
}

/// Build the success comment for a finished run.
pub fn success_comment(
    config: &RunConfiguration,
    author: &str,
    snapshots: &[Snapshot],
    package_manager: PackageManager,
) -> String {
    let mut sections = Vec::new();

    if let Some(prefix) = &config.custom_message_prefix {
        sections.push(prefix.clone());
    }

    let has_have = if snapshots.len() == 1 { "has" } else { "have" };
    let destination = match &config.branch {
        Some(branch) => format!("been pushed to the `{branch}` branch"),
        None => "been published to npm".to_string(),
    };
    sections.push(format!(
        "🫰✨ **Thanks @{author}! Your snapshot{} {has_have} {destination}.**",
        plural(snapshots.len())
    ));

    let shown = filter_included(snapshots, config.included_packages.as_deref());
    if !shown.is_empty() {
        let block = if config.global_install {
            global_install_block(&shown, package_manager)
        } else {
            dependency_block(&shown)
        };
        sections.push(block);
    }

    if let Some(suffix) = &config.custom_message_suffix {
        sections.push(suffix.clone());
    }

    sections.join("\n\n")
}
