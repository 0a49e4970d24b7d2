use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeightError>;

/// Fatal errors only. Per-commit query failures are absorbed as
/// zero-contribution results and never surface through this type.
#[derive(Error, Debug)]
pub enum WeightError {
    #[error("'{0}' is not inside a git working tree; point at a cloned or initialized repository")]
    NotARepository(PathBuf),
    #[error("path '{0}' does not exist")]
    PathMissing(PathBuf),
    #[error("path '{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("branch '{0}' does not exist in the repository")]
    BranchNotFound(String),
    #[error("could not auto-detect 'master' or 'main'; pass --branch to name the trunk branch")]
    NoTrunkBranch,
    #[error("git {command} failed: {detail}")]
    GitInvocation { command: String, detail: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
