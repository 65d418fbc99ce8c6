// GitHub provider - bridges the API client with the RepositorySource trait
use std::time::Duration;

use async_trait::async_trait;
use repowatch_api::{github::Result as ApiResult, GitHubClient, GitHubRepo, GitHubSearchItem};

use crate::{config::GitHubConfig, source::RepositorySource, Result};

/// Wrapper around GitHubClient that implements RepositorySource
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let client = GitHubClient::with_base_url(
            config.token.clone(),
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl RepositorySource for GitHubProvider {
    async fn get_repository(&self, owner: &str, name: &str) -> ApiResult<GitHubRepo> {
        self.client.get_repository(owner, name).await
    }

    async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
    ) -> ApiResult<Vec<GitHubSearchItem>> {
        self.client.search_repositories(query, per_page).await
    }
}
