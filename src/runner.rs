//! Sequential subprocess execution.
//!
//! Every external tool (package manager, changeset CLI, user scripts) goes
//! through [`CommandRunner`] so the pipeline can be driven by a fake in tests.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use crate::error::{AppError, Result};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status of a finished command. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion. Errors only when it cannot be started.
    async fn run(&self, command: &CommandSpec) -> Result<CommandStatus>;
}

/// Runs commands as child processes rooted at a fixed directory.
///
/// Output is inherited so it shows up in the workflow log as it happens.
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        tracing::info!(command = %command, cwd = %self.cwd.display(), "Running command");

        let status = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| AppError::Command(format!("Failed to start `{command}`: {e}")))?;

        Ok(CommandStatus {
            code: status.code(),
        })
    }
}

/// Split a `&&`-joined script into commands, each split on whitespace.
pub fn parse_script(script: &str) -> Vec<CommandSpec> {
    script
        .split("&&")
        .filter_map(|part| {
            let mut words = part.split_whitespace();
            let program = words.next()?;
            Some(CommandSpec {
                program: program.to_string(),
                args: words.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Run a built-in tool invocation, failing on a non-zero exit.
pub async fn run_checked(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<()> {
    let status = runner.run(command).await?;
    if !status.success() {
        return Err(AppError::Command(format!("`{command}` failed with {status}")));
    }
    Ok(())
}

/// Run a user-supplied script, stopping at the first failing command.
pub async fn run_script(runner: &dyn CommandRunner, script: &str) -> Result<()> {
    for command in parse_script(script) {
        let status = runner
            .run(&command)
            .await
            .map_err(|e| AppError::ScriptExecution {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(AppError::ScriptExecution {
                command: command.to_string(),
                message: status.to_string(),
            });
        }
    }
    Ok(())
}
