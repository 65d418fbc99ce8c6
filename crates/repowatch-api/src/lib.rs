// GitHub REST API client used by the scanner
pub mod github;

// Re-export common types
pub use github::{GitHubClient, GitHubError, GitHubRepo, GitHubSearchItem, SearchResponse};
