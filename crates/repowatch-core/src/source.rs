use repowatch_api::{github::Result as ApiResult, GitHubRepo, GitHubSearchItem};

/// Where repository data comes from.
///
/// The scanner only ever talks to this trait, so tests can hand it a mock
/// instead of hitting GitHub.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// Metadata for `owner/name`; 404 surfaces as `GitHubError::NotFound`
    async fn get_repository(&self, owner: &str, name: &str) -> ApiResult<GitHubRepo>;

    /// Keyword search, at most `per_page` hits
    async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
    ) -> ApiResult<Vec<GitHubSearchItem>>;
}
