use chrono::{DateTime, Utc};
use repowatch_api::GitHubRepo;
use serde::{Deserialize, Serialize};

use crate::freshness::{Freshness, UNKNOWN_AGE_DAYS};

/// What kind of resource a tracked repository is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Archive,
    Index,
    Analysis,
    Visualization,
    Torrents,
    Search,
    Dataset,
    Community,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Archive => write!(f, "archive"),
            Category::Index => write!(f, "index"),
            Category::Analysis => write!(f, "analysis"),
            Category::Visualization => write!(f, "visualization"),
            Category::Torrents => write!(f, "torrents"),
            Category::Search => write!(f, "search"),
            Category::Dataset => write!(f, "dataset"),
            Category::Community => write!(f, "community"),
        }
    }
}

/// A repository the scanner knows about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub url: String,
    /// Display name, not necessarily the GitHub repo name
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: Category,
    /// Companion site, rendered as a secondary link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl RepositoryRecord {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            description: description.into(),
            category,
            website: None,
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// `(owner, name)` taken from the URL path
    pub fn slug(&self) -> Option<(String, String)> {
        parse_slug(&self.url)
    }

    /// `owner/name`, or the URL itself when it has no usable path
    pub fn full_name(&self) -> String {
        match self.slug() {
            Some((owner, name)) => format!("{}/{}", owner, name),
            None => self.url.clone(),
        }
    }
}

/// Pull `owner` and `name` out of a repository URL.
///
/// Accepts full URLs (`https://github.com/owner/name`, with or without a
/// trailing slash or `.git`) and bare `owner/name` strings.
pub fn parse_slug(url: &str) -> Option<(String, String)> {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if name.is_empty() {
        return None;
    }

    Some((owner.to_string(), name.to_string()))
}

/// Metadata captured for an active repository
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoMetadata {
    pub last_updated: Option<String>,
    pub created_at: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub size_kb: u64,
    pub default_branch: String,
    pub language: Option<String>,
    pub open_issues: u64,
}

impl From<GitHubRepo> for RepoMetadata {
    fn from(gh: GitHubRepo) -> Self {
        Self {
            last_updated: gh.updated_at,
            created_at: gh.created_at,
            stars: gh.stargazers_count.unwrap_or(0),
            forks: gh.forks_count.unwrap_or(0),
            size_kb: gh.size.unwrap_or(0),
            default_branch: gh.default_branch.unwrap_or_else(|| "main".to_string()),
            language: gh.language,
            open_issues: gh.open_issues_count.unwrap_or(0),
        }
    }
}

/// Outcome of checking one repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RepoStatus {
    Active(RepoMetadata),
    Removed { error: String },
    Error { error: String },
}

impl RepoStatus {
    pub fn removed() -> Self {
        RepoStatus::Removed {
            error: "Repository not found".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RepoStatus::Error {
            error: message.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RepoStatus::Active(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepoStatus::Active(_) => "active",
            RepoStatus::Removed { .. } => "removed",
            RepoStatus::Error { .. } => "error",
        }
    }
}

/// One row of a scan: the record, what we found, and how fresh it is.
///
/// Serialized flat, so the snapshot JSON has `url`, `status`, `stars` etc.
/// side by side on each entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEntry {
    #[serde(flatten)]
    pub record: RepositoryRecord,
    #[serde(flatten)]
    pub status: RepoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness: Option<Freshness>,
    #[serde(default)]
    pub is_new: bool,
    pub checked_at: DateTime<Utc>,
}

impl ScanEntry {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn metadata(&self) -> Option<&RepoMetadata> {
        match &self.status {
            RepoStatus::Active(meta) => Some(meta),
            _ => None,
        }
    }

    /// Age used for ordering; entries without freshness sort as unknown
    pub fn days_old(&self) -> i64 {
        self.freshness
            .as_ref()
            .map(|f| f.days_old)
            .unwrap_or(UNKNOWN_AGE_DAYS)
    }
}
