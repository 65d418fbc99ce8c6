use std::path::PathBuf;

use repowatch_api::GitHubError;
use thiserror::Error;

/// Everything that can fail outside of a single repository check.
///
/// Per-repository API failures never show up here: the resolver folds them
/// into that repository's `RepoStatus` so one bad repo can't sink a scan.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(#[from] GitHubError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Template document not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Anchor not found in template: {0}")]
    AnchorNotFound(String),

    #[error("Scan timed out after {0} seconds")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
