use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, Result};

pub const DEFAULT_COMMENT_COMMAND: &str = "/snapit";
pub const DEFAULT_RELEASE_BRANCH: &str = "changeset-release/main";

/// Action inputs as delivered by the runner (`INPUT_<NAME>`) or a local config file.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ActionInputs {
    #[serde(default)]
    pub comment_command: Option<String>,
    #[serde(default)]
    pub build_script: Option<String>,
    #[serde(default)]
    pub post_install_script: Option<String>,
    #[serde(default)]
    pub global_install: Option<String>,
    #[serde(default)]
    pub github_comment_included_packages: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub custom_message_prefix: Option<String>,
    #[serde(default)]
    pub custom_message_suffix: Option<String>,
    #[serde(default)]
    pub release_branch: Option<String>,
}

/// Runtime context and secrets taken from plain environment variables.
#[derive(Default, Deserialize, Clone)]
pub struct RuntimeEnv {
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub npm_token: Option<String>,
    #[serde(default)]
    pub github_event_path: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
}

// Manual Debug impl to avoid leaking tokens
impl std::fmt::Debug for RuntimeEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeEnv")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("npm_token", &self.npm_token.as_ref().map(|_| "[REDACTED]"))
            .field("github_event_path", &self.github_event_path)
            .field("home", &self.home)
            .finish()
    }
}

/// Everything the pipeline needs, resolved once at startup.
#[derive(Clone)]
pub struct RunConfiguration {
    pub github_token: String,
    pub npm_token: Option<String>,
    pub event_path: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    pub comment_commands: Vec<String>,
    pub build_script: Option<String>,
    pub post_install_script: Option<String>,
    pub global_install: bool,
    pub included_packages: Option<Vec<String>>,
    pub branch: Option<String>,
    pub working_directory: PathBuf,
    pub custom_message_prefix: Option<String>,
    pub custom_message_suffix: Option<String>,
    pub release_branch: String,
}

// Manual Debug impl to avoid leaking tokens
impl std::fmt::Debug for RunConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfiguration")
            .field("github_token", &"[REDACTED]")
            .field("npm_token", &self.npm_token.as_ref().map(|_| "[REDACTED]"))
            .field("event_path", &self.event_path)
            .field("home_dir", &self.home_dir)
            .field("comment_commands", &self.comment_commands)
            .field("build_script", &self.build_script)
            .field("post_install_script", &self.post_install_script)
            .field("global_install", &self.global_install)
            .field("included_packages", &self.included_packages)
            .field("branch", &self.branch)
            .field("working_directory", &self.working_directory)
            .field("custom_message_prefix", &self.custom_message_prefix)
            .field("custom_message_suffix", &self.custom_message_suffix)
            .field("release_branch", &self.release_branch)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(name: &str, value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(AppError::Configuration(format!(
            "Input `{name}` must be a boolean, got `{other}`"
        ))),
    }
}

impl RunConfiguration {
    /// Load from the process environment and an optional TOML file.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_from(config_path, None, None)
    }

    /// Load with injectable environment maps. `None` reads the process environment.
    pub fn load_from(
        config_path: Option<&str>,
        inputs_env: Option<HashMap<String, String>>,
        runtime_env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("snapit").required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("INPUT").source(inputs_env),
        );

        let inputs: ActionInputs = builder
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let runtime: RuntimeEnv = config::Config::builder()
            .add_source(config::Environment::default().source(runtime_env))
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Self::resolve(inputs, runtime)
    }

    /// Validate raw inputs and apply defaults.
    pub fn resolve(inputs: ActionInputs, runtime: RuntimeEnv) -> Result<Self> {
        let github_token = non_empty(runtime.github_token).ok_or_else(|| {
            AppError::Configuration(
                "Please provide the GITHUB_TOKEN to the snapit GitHub action".to_string(),
            )
        })?;

        let branch = non_empty(inputs.branch).map(|b| b.trim().to_string());
        let npm_token = non_empty(runtime.npm_token);
        if branch.is_none() && npm_token.is_none() {
            return Err(AppError::Configuration(
                "Please provide the NPM_TOKEN to the snapit GitHub action".to_string(),
            ));
        }

        let mut comment_commands = non_empty(inputs.comment_command)
            .map(|c| split_list(&c))
            .unwrap_or_default();
        if comment_commands.is_empty() {
            comment_commands.push(DEFAULT_COMMENT_COMMAND.to_string());
        }

        let global_install = parse_flag("global_install", inputs.global_install.as_deref())?;

        let included_packages = non_empty(inputs.github_comment_included_packages)
            .map(|p| split_list(&p))
            .filter(|p| !p.is_empty());

        let working_directory = non_empty(inputs.working_directory)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            github_token,
            npm_token,
            event_path: non_empty(runtime.github_event_path).map(PathBuf::from),
            home_dir: non_empty(runtime.home).map(PathBuf::from),
            comment_commands,
            build_script: non_empty(inputs.build_script),
            post_install_script: non_empty(inputs.post_install_script),
            global_install,
            included_packages,
            branch,
            working_directory,
            custom_message_prefix: non_empty(inputs.custom_message_prefix),
            custom_message_suffix: non_empty(inputs.custom_message_suffix),
            release_branch: non_empty(inputs.release_branch)
                .map(|b| b.trim().to_string())
                .unwrap_or_else(|| DEFAULT_RELEASE_BRANCH.to_string()),
        })
    }

    pub fn github_token(&self) -> &str {
        &self.github_token
    }

    pub fn is_branch_mode(&self) -> bool {
        self.branch.is_some()
    }
}
