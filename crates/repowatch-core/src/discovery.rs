// Finding repositories we don't track yet
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use repowatch_api::GitHubSearchItem;
use tracing::{debug, info, warn};

use crate::{
    freshness::Freshness,
    models::{parse_slug, Category, RepoMetadata, RepoStatus, RepositoryRecord, ScanEntry},
    registry::Registry,
    source::RepositorySource,
};

/// Run the keyword search and keep only repositories missing from `registry`.
///
/// A failed search is logged and treated as "nothing found".
pub async fn search_new_repos<S>(
    source: &S,
    query: &str,
    max_results: u32,
    registry: &Registry,
    now: DateTime<Utc>,
) -> Vec<ScanEntry>
where
    S: RepositorySource + ?Sized,
{
    match source.search_repositories(query, max_results).await {
        Ok(items) => {
            debug!(query, hits = items.len(), "search returned");
            let found = filter_new(items, registry, now);
            info!(query, new = found.len(), "discovery finished");
            found
        }
        Err(e) => {
            warn!(query, error = %e, "repository search failed");
            Vec::new()
        }
    }
}

/// Drop known and duplicate URLs, convert the rest into new scan entries
pub fn filter_new(
    items: Vec<GitHubSearchItem>,
    registry: &Registry,
    now: DateTime<Utc>,
) -> Vec<ScanEntry> {
    let mut seen = HashSet::new();

    items
        .into_iter()
        .filter_map(|item| {
            let url = item.html_url.clone()?;
            if registry.contains_url(&url) || !seen.insert(url) {
                return None;
            }
            Some(search_item_to_entry(item, now))
        })
        .collect()
}

fn search_item_to_entry(item: GitHubSearchItem, now: DateTime<Utc>) -> ScanEntry {
    let url = item.html_url.unwrap_or_default();
    let name = item
        .name
        .or_else(|| parse_slug(&url).map(|(_, name)| name))
        .unwrap_or_else(|| url.clone());
    let description = item
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "No description".to_string());

    let freshness = Freshness::classify_opt(item.updated_at.as_deref(), now);

    ScanEntry {
        record: RepositoryRecord::new(url, name, description, Category::Community),
        status: RepoStatus::Active(RepoMetadata {
            last_updated: item.updated_at,
            created_at: item.created_at,
            stars: item.stargazers_count.unwrap_or(0),
            forks: 0,
            size_kb: item.size.unwrap_or(0),
            default_branch: "main".to_string(),
            language: item.language,
            open_issues: 0,
        }),
        freshness: Some(freshness),
        is_new: true,
        checked_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRepositorySource;
    use chrono::TimeZone;
    use repowatch_api::GitHubError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn item(owner: &str, name: &str) -> GitHubSearchItem {
        GitHubSearchItem {
            name: Some(name.to_string()),
            full_name: Some(format!("{owner}/{name}")),
            html_url: Some(format!("https://github.com/{owner}/{name}")),
            description: Some(format!("{name} description")),
            stargazers_count: Some(4),
            updated_at: Some("2025-06-14T00:00:00Z".into()),
            created_at: Some("2025-01-01T00:00:00Z".into()),
            size: Some(100),
            language: None,
        }
    }

    fn registry() -> Registry {
        Registry::new(vec![RepositoryRecord::new(
            "https://github.com/known/repo",
            "repo",
            "already tracked",
            Category::Archive,
        )])
    }

    #[test]
    fn test_known_urls_are_excluded() {
        let items = vec![item("known", "repo"), item("fresh", "one"), item("fresh", "two")];
        let found = filter_new(items, &registry(), now());

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|e| !registry().contains_url(&e.record.url)));
        assert!(found.iter().all(|e| e.is_new));
        assert!(found.iter().all(|e| e.record.category == Category::Community));
    }

    #[test]
    fn test_order_preserved_and_duplicates_collapsed() {
        let items = vec![item("b", "two"), item("a", "one"), item("b", "two")];
        let found = filter_new(items, &Registry::default(), now());

        let urls: Vec<_> = found.iter().map(|e| e.record.url.as_str()).collect();
        assert_eq!(urls, ["https://github.com/b/two", "https://github.com/a/one"]);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let sparse = GitHubSearchItem {
            html_url: Some("https://github.com/x/y".into()),
            description: Some("   ".into()),
            ..Default::default()
        };
        let found = filter_new(vec![sparse, GitHubSearchItem::default()], &Registry::default(), now());

        // the item without a URL is dropped
        assert_eq!(found.len(), 1);
        let entry = &found[0];
        assert_eq!(entry.record.name, "y");
        assert_eq!(entry.record.description, "No description");
        assert_eq!(entry.metadata().unwrap().stars, 0);
        assert_eq!(entry.freshness, Some(Freshness::unknown()));
    }

    #[test]
    fn test_provisional_freshness() {
        let found = filter_new(vec![item("a", "b")], &Registry::default(), now());
        assert_eq!(found[0].freshness.as_ref().unwrap().freshness, "yesterday");
    }

    #[tokio::test]
    async fn test_search_passes_query_and_cap() {
        let mut source = MockRepositorySource::new();
        source
            .expect_search_repositories()
            .withf(|query, per_page| query == "epstein files" && *per_page == 20)
            .times(1)
            .returning(|_, _| Ok(vec![item("new", "thing")]));

        let found = search_new_repos(&source, "epstein files", 20, &registry(), now()).await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_yields_nothing() {
        let mut source = MockRepositorySource::new();
        source
            .expect_search_repositories()
            .returning(|_, _| Err(GitHubError::UnexpectedStatus(422)));

        let found = search_new_repos(&source, "q", 5, &registry(), now()).await;
        assert!(found.is_empty());
    }
}
