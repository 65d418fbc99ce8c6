use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl GitHubError {
    /// True when the server answered 404 for the requested resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    /// For GitHub Enterprise or testing against a local server
    pub fn with_base_url(token: Option<String>, base_url: String, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("repowatch/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch metadata for `owner/name`.
    ///
    /// A 404 comes back as `GitHubError::NotFound`, any other non-success
    /// status as `GitHubError::UnexpectedStatus`. No retries: one request,
    /// bounded by the client timeout.
    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<GitHubRepo> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);
        let full_name = format!("{}/{}", owner, name);
        debug!(%url, "fetching repository metadata");

        let response = self.authorized(self.client.get(&url)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(full_name));
        }

        if !status.is_success() {
            return Err(GitHubError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let repo: GitHubRepo = serde_json::from_str(&body)?;
        Ok(repo)
    }

    /// Search repositories, most recently updated first
    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<GitHubSearchItem>> {
        let url = format!("{}/search/repositories", self.base_url);
        debug!(%url, query, per_page, "searching repositories");

        let per_page = per_page.to_string();
        let request = self.client.get(&url).query(&[
            ("q", query),
            ("sort", "updated"),
            ("order", "desc"),
            ("per_page", per_page.as_str()),
        ]);

        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(query.to_string()));
        }

        if !status.is_success() {
            return Err(GitHubError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let results: SearchResponse = serde_json::from_str(&body)?;
        Ok(results.items)
    }
}

/// Repository metadata as returned by `GET /repos/{owner}/{repo}`.
///
/// Every field is optional: the scanner treats a sparse payload as
/// "active with defaults" rather than as a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubRepo {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub size: Option<u64>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub open_issues_count: Option<u64>,
}

/// One hit from `GET /search/repositories`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSearchItem {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    pub size: Option<u64>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub total_count: Option<u64>,
    pub incomplete_results: Option<bool>,
    pub items: Vec<GitHubSearchItem>,
}
