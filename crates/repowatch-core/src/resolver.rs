// Turns one API round-trip into a RepoStatus
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    freshness::Freshness,
    models::{parse_slug, RepoMetadata, RepoStatus, RepositoryRecord, ScanEntry},
    source::RepositorySource,
};

/// Check whether the repository behind `url` is still there.
///
/// 404 maps to `Removed`; any other failure, transport errors included,
/// becomes `Error` with the failure text. Never returns an error itself.
pub async fn resolve_status<S>(source: &S, url: &str) -> RepoStatus
where
    S: RepositorySource + ?Sized,
{
    let Some((owner, name)) = parse_slug(url) else {
        warn!(%url, "no owner/name in repository URL");
        return RepoStatus::error(format!("Invalid repository URL: {}", url));
    };

    match source.get_repository(&owner, &name).await {
        Ok(repo) => RepoStatus::Active(RepoMetadata::from(repo)),
        Err(e) if e.is_not_found() => RepoStatus::removed(),
        Err(e) => {
            debug!(%url, error = %e, "repository check failed");
            RepoStatus::error(e.to_string())
        }
    }
}

/// Resolve a known repository and annotate it with freshness
pub async fn check_repository<S>(
    source: &S,
    record: &RepositoryRecord,
    now: DateTime<Utc>,
) -> ScanEntry
where
    S: RepositorySource + ?Sized,
{
    let status = resolve_status(source, &record.url).await;
    let freshness = match &status {
        RepoStatus::Active(meta) => Some(Freshness::classify_opt(meta.last_updated.as_deref(), now)),
        _ => None,
    };

    ScanEntry {
        record: record.clone(),
        status,
        freshness,
        is_new: false,
        checked_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{freshness::FreshnessClass, models::Category, source::MockRepositorySource};
    use chrono::TimeZone;
    use repowatch_api::{GitHubError, GitHubRepo};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_active_repository() {
        let mut source = MockRepositorySource::new();
        source
            .expect_get_repository()
            .withf(|owner, name| owner == "octo" && name == "hello")
            .times(1)
            .returning(|_, _| {
                Ok(GitHubRepo {
                    updated_at: Some("2025-06-12T00:00:00Z".into()),
                    stargazers_count: Some(12),
                    forks_count: Some(3),
                    size: Some(2048),
                    language: Some("Python".into()),
                    ..Default::default()
                })
            });

        let record = RepositoryRecord::new(
            "https://github.com/octo/hello",
            "hello",
            "test repo",
            Category::Archive,
        );
        let entry = check_repository(&source, &record, now()).await;

        let meta = entry.metadata().expect("should be active");
        assert_eq!(meta.stars, 12);
        assert_eq!(meta.size_kb, 2048);
        assert_eq!(meta.default_branch, "main");
        assert!(!entry.is_new);

        let freshness = entry.freshness.unwrap();
        assert_eq!(freshness.days_old, 3);
        assert_eq!(freshness.color, FreshnessClass::Week);
    }

    #[tokio::test]
    async fn test_active_without_timestamp_is_unknown() {
        let mut source = MockRepositorySource::new();
        source
            .expect_get_repository()
            .returning(|_, _| Ok(GitHubRepo::default()));

        let record = RepositoryRecord::new("https://github.com/a/b", "b", "", Category::Index);
        let entry = check_repository(&source, &record, now()).await;

        assert!(entry.is_active());
        assert_eq!(entry.freshness, Some(Freshness::unknown()));
    }

    #[tokio::test]
    async fn test_not_found_is_removed() {
        let mut source = MockRepositorySource::new();
        source
            .expect_get_repository()
            .returning(|owner, name| Err(GitHubError::NotFound(format!("{owner}/{name}"))));

        let status = resolve_status(&source, "https://github.com/gone/away").await;
        assert_eq!(status, RepoStatus::removed());
    }

    #[tokio::test]
    async fn test_other_status_is_error_with_code() {
        let mut source = MockRepositorySource::new();
        source
            .expect_get_repository()
            .returning(|_, _| Err(GitHubError::UnexpectedStatus(403)));

        let status = resolve_status(&source, "https://github.com/rate/limited").await;
        assert_eq!(status, RepoStatus::error("HTTP 403"));
    }

    #[tokio::test]
    async fn test_decode_failure_is_error() {
        let mut source = MockRepositorySource::new();
        source.expect_get_repository().returning(|_, _| {
            let err = serde_json::from_str::<GitHubRepo>("not json").unwrap_err();
            Err(GitHubError::ParseError(err))
        });

        let status = resolve_status(&source, "https://github.com/a/b").await;
        match status {
            RepoStatus::Error { error } => assert!(error.starts_with("JSON parsing failed")),
            other => panic!("expected error status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_skips_network() {
        let mut source = MockRepositorySource::new();
        source.expect_get_repository().times(0);

        let status = resolve_status(&source, "https://github.com/").await;
        assert_eq!(status.label(), "error");
    }

    #[tokio::test]
    async fn test_non_active_has_no_freshness() {
        let mut source = MockRepositorySource::new();
        source
            .expect_get_repository()
            .returning(|_, _| Err(GitHubError::UnexpectedStatus(500)));

        let record = RepositoryRecord::new("https://github.com/a/b", "b", "", Category::Search);
        let entry = check_repository(&source, &record, now()).await;
        assert_eq!(entry.freshness, None);
        assert_eq!(entry.days_old(), crate::UNKNOWN_AGE_DAYS);
    }
}
