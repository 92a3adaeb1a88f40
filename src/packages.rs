//! Package manager detection and workspace package discovery.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::runner::CommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Pnpm,
    Npm,
}

impl PackageManager {
    /// Infer from lockfiles: yarn first, then pnpm, else npm.
    pub fn detect(root: &Path) -> Self {
        if root.join("yarn.lock").exists() {
            PackageManager::Yarn
        } else if root.join("pnpm-lock.yaml").exists() {
            PackageManager::Pnpm
        } else {
            PackageManager::Npm
        }
    }

    /// Locked install command.
    pub fn install_command(self) -> CommandSpec {
        match self {
            PackageManager::Yarn => CommandSpec::new("yarn", &["install", "--frozen-lockfile"]),
            PackageManager::Pnpm => CommandSpec::new("pnpm", &["install", "--frozen-lockfile"]),
            PackageManager::Npm => CommandSpec::new("npm", &["ci"]),
        }
    }

    /// Prefix used in the report to install a package globally.
    pub fn global_add(self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn global add",
            PackageManager::Pnpm => "pnpm add -g",
            PackageManager::Npm => "npm i -g",
        }
    }
}

/// The fields of a `package.json` the pipeline cares about.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RootManifest {
    #[serde(default)]
    workspaces: Option<WorkspacesField>,
}

async fn read_manifest(dir: &Path) -> Result<PackageManifest> {
    let path = dir.join("package.json");
    let raw = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Manifest(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_slice(&raw)
        .map_err(|e| AppError::Manifest(format!("Failed to parse {}: {e}", path.display())))
}

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

/// Extract the `packages:` list from `pnpm-workspace.yaml`.
fn parse_pnpm_workspace(contents: &str) -> Result<Vec<String>> {
    // An empty or comment-only document deserializes to `None`
    let workspace: Option<PnpmWorkspace> = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Manifest(format!("Failed to parse pnpm-workspace.yaml: {e}")))?;
    Ok(workspace.unwrap_or_default().packages)
}

async fn workspace_patterns(root: &Path) -> Result<Vec<String>> {
    let mut patterns = Vec::new();

    let raw = tokio::fs::read(root.join("package.json"))
        .await
        .map_err(|e| AppError::Manifest(format!("Failed to read root package.json: {e}")))?;
    let root_manifest: RootManifest = serde_json::from_slice(&raw)
        .map_err(|e| AppError::Manifest(format!("Failed to parse root package.json: {e}")))?;
    match root_manifest.workspaces {
        Some(WorkspacesField::List(list)) => patterns.extend(list),
        Some(WorkspacesField::Object { packages }) => patterns.extend(packages),
        None => {}
    }

    let pnpm_workspace = root.join("pnpm-workspace.yaml");
    if pnpm_workspace.exists() {
        let contents = tokio::fs::read_to_string(&pnpm_workspace).await?;
        patterns.extend(parse_pnpm_workspace(&contents)?);
    }

    Ok(patterns)
}

fn in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"))
}

fn expand_patterns(root: &Path, patterns: &[String]) -> Result<BTreeSet<PathBuf>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());

    let mut excludes = Vec::new();
    for pattern in patterns.iter().filter_map(|p| p.strip_prefix('!')) {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        excludes.push(
            glob::Pattern::new(pattern)
                .map_err(|e| AppError::Manifest(format!("Invalid workspace pattern {pattern}: {e}")))?,
        );
    }

    let mut dirs = BTreeSet::new();
    for pattern in patterns.iter().filter(|p| !p.starts_with('!')) {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        let full = format!("{escaped_root}/{pattern}");
        let entries = glob::glob(&full)
            .map_err(|e| AppError::Manifest(format!("Invalid workspace pattern {pattern}: {e}")))?;

        for entry in entries.flatten() {
            if !entry.is_dir() || !entry.join("package.json").is_file() {
                continue;
            }
            let relative = entry.strip_prefix(root).unwrap_or(&entry);
            if in_node_modules(relative) || excludes.iter().any(|ex| ex.matches_path(relative)) {
                continue;
            }
            dirs.insert(entry);
        }
    }

    Ok(dirs)
}

/// Read the root manifest and every workspace package manifest.
pub async fn scan_workspace(root: &Path) -> Result<Vec<PackageManifest>> {
    let patterns = workspace_patterns(root).await?;
    let dirs = expand_patterns(root, &patterns)?;

    let mut manifests = vec![read_manifest(root).await?];
    for dir in dirs {
        if dir == root {
            continue;
        }
        manifests.push(read_manifest(&dir).await?);
    }

    tracing::debug!(count = manifests.len(), "Scanned workspace packages");
    Ok(manifests)
}
