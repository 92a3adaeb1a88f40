use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("Command `{command}` failed: {message}")]
    ScriptExecution { command: String, message: String },

    #[error("{0}")]
    NoSnapshotsProduced(String),

    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Git operation failed: {0}")]
    Git(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Invalid package manifest: {0}")]
    Manifest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<octocrab::Error> for AppError {
    fn from(e: octocrab::Error) -> Self {
        AppError::GitHubApi(e.to_string())
    }
}

impl From<git2::Error> for AppError {
    fn from(e: git2::Error) -> Self {
        AppError::Git(e.message().to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
