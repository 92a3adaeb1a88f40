use crate::error::{AppError, Result};
use crate::packages::PackageManifest;

/// Prerelease tag passed to `changeset version --snapshot` and `publish --tag`.
pub const SNAPSHOT_TAG: &str = "snapshot";

/// A package version produced by `changeset version --snapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub package_name: String,
    pub version: String,
    /// Suffix following `snapshot-` in the version, e.g. `20240101120000`.
    pub timestamp: String,
    /// `name@version`, suitable for install commands.
    pub full_identifier: String,
}

impl Snapshot {
    /// A manifest qualifies when it is public, named and carries the snapshot tag.
    pub fn from_manifest(manifest: &PackageManifest) -> Option<Self> {
        if manifest.private {
            return None;
        }
        let name = manifest.name.as_deref()?;
        let version = manifest.version.as_deref()?;
        if !version.contains(SNAPSHOT_TAG) {
            return None;
        }

        let marker = format!("{SNAPSHOT_TAG}-");
        let timestamp = version
            .find(&marker)
            .map(|idx| version[idx + marker.len()..].to_string())
            .unwrap_or_default();

        Some(Self {
            package_name: name.to_string(),
            version: version.to_string(),
            timestamp,
            full_identifier: format!("{name}@{version}"),
        })
    }

    /// `snapshot-<timestamp>`, used in branch-mode commit messages.
    pub fn tag(&self) -> String {
        if self.timestamp.is_empty() {
            SNAPSHOT_TAG.to_string()
        } else {
            format!("{SNAPSHOT_TAG}-{}", self.timestamp)
        }
    }
}

pub fn collect_snapshots(manifests: &[PackageManifest]) -> Vec<Snapshot> {
    manifests.iter().filter_map(Snapshot::from_manifest).collect()
}

/// Fail when versioning produced nothing to publish.
pub fn require_snapshots(snapshots: Vec<Snapshot>) -> Result<Vec<Snapshot>> {
    if snapshots.is_empty() {
        return Err(AppError::NoSnapshotsProduced(
            "Changeset version did not produce any snapshot versions. Does this pull request include a changeset?"
                .to_string(),
        ));
    }
    Ok(snapshots)
}
