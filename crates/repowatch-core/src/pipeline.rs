// One complete run: scan, save the snapshot, rewrite the page, remember discoveries
use chrono::Local;
use tracing::{error, info};

use crate::{
    config::Config,
    registry::Registry,
    render,
    scanner::Scanner,
    snapshot::ScanSnapshot,
    source::RepositorySource,
    splice, Result,
};

/// Result of a full run
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub snapshot: ScanSnapshot,
    /// Registry after discoveries were appended
    pub registry: Registry,
    /// How many discoveries were new to the registry
    pub added: usize,
    pub html_updated: bool,
    /// Why the page wasn't rewritten, if it wasn't
    pub html_error: Option<String>,
    /// Why the registry file wasn't written; `registry` is still current
    pub registry_error: Option<String>,
}

impl ScanReport {
    pub fn known_scanned(&self) -> usize {
        self.snapshot.total_repos - self.snapshot.new_repos
    }
}

/// Scan, then persist everything.
///
/// The snapshot is written before the page; a snapshot write failure aborts
/// the run. Page and registry file failures are reported in the `ScanReport`.
/// Nothing is written if the future is dropped mid-scan.
pub async fn run_full_scan<S: RepositorySource>(
    scanner: &Scanner<S>,
    registry: &Registry,
    config: &Config,
) -> Result<ScanReport> {
    let outcome = scanner.scan(registry).await;

    let (registry, added) = registry.merged(&outcome.discovered);
    if added > 0 {
        info!(added, "added new repositories to tracking list");
    }

    outcome.snapshot.save(&config.output.snapshot_path)?;

    let cards = render::render_cards(&outcome.snapshot);
    let stamp = splice::format_scan_time(&Local::now());
    let (html_updated, html_error) = match splice::update_html_file(
        &config.output.html_path,
        &cards,
        &config.template,
        &stamp,
    ) {
        Ok(()) => (true, None),
        Err(e) => {
            error!(path = %config.output.html_path.display(), error = %e, "HTML update failed");
            (false, Some(e.to_string()))
        }
    };

    let registry_error = match &config.output.registry_path {
        Some(path) => registry.save(path).err().map(|e| {
            error!(path = %path.display(), error = %e, "registry save failed");
            e.to_string()
        }),
        None => None,
    };

    let report = ScanReport {
        snapshot: outcome.snapshot,
        registry,
        added,
        html_updated,
        html_error,
        registry_error,
    };

    info!(
        known = report.known_scanned(),
        active = report.snapshot.active_repos,
        removed = report.snapshot.removed_repos,
        errors = report.snapshot.error_repos,
        new = report.snapshot.new_repos,
        html_updated = report.html_updated,
        "scan summary"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Category, RepositoryRecord},
        scanner::ScanOptions,
        source::MockRepositorySource,
    };
    use chrono::Utc;
    use repowatch_api::{GitHubError, GitHubRepo, GitHubSearchItem};
    use std::time::Duration;
    use tempfile::TempDir;

    const PAGE: &str = "<html>\nLast Updated: old | x\n<!-- GitHub Repositories -->\n<div class=\"source-category\">\n<h3>📦 GitHub Repositories</h3>\n<p class=\"category-description\">Repos</p>\nstale\n<!-- Archive.org Mirrors -->\n</html>\n";

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.output.snapshot_path = dir.path().join("results.json");
        config.output.html_path = dir.path().join("tracker.html");
        config.output.registry_path = Some(dir.path().join("registry.json"));
        config
    }

    fn scanner() -> Scanner<MockRepositorySource> {
        let mut source = MockRepositorySource::new();
        source.expect_get_repository().returning(|_, name| {
            if name == "alive" {
                Ok(GitHubRepo {
                    updated_at: Some(Utc::now().to_rfc3339()),
                    stargazers_count: Some(9),
                    ..Default::default()
                })
            } else {
                Err(GitHubError::NotFound(name.to_string()))
            }
        });
        source.expect_search_repositories().returning(|_, _| {
            Ok(vec![GitHubSearchItem {
                name: Some("found".into()),
                html_url: Some("https://github.com/someone/found".into()),
                updated_at: Some(Utc::now().to_rfc3339()),
                ..Default::default()
            }])
        });

        Scanner::new(
            source,
            ScanOptions {
                request_delay: Duration::ZERO,
                ..ScanOptions::default()
            },
        )
    }

    fn registry() -> Registry {
        Registry::new(vec![
            RepositoryRecord::new("https://github.com/o/alive", "alive", "up", Category::Archive),
            RepositoryRecord::new("https://github.com/o/dead", "dead", "down", Category::Dataset),
        ])
    }

    #[tokio::test]
    async fn test_full_run_writes_everything() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        std::fs::write(&config.output.html_path, PAGE).unwrap();

        let report = run_full_scan(&scanner(), &registry(), &config).await.unwrap();

        assert!(report.html_updated);
        assert_eq!(report.added, 1);
        assert_eq!(report.known_scanned(), 2);
        assert_eq!(report.registry.len(), 3);

        let html = std::fs::read_to_string(&config.output.html_path).unwrap();
        assert!(!html.contains("stale"));
        assert!(html.contains("<h4>📦 alive</h4>"));
        assert!(html.contains("<h4>📦 found</h4>"));
        assert!(!html.contains("<h4>📦 dead</h4>"));
        assert!(!html.contains("Last Updated: old |"));

        let snapshot = ScanSnapshot::load(&config.output.snapshot_path).unwrap();
        assert_eq!(snapshot.total_repos, 3);
        assert_eq!(snapshot.removed_repos, 1);

        let saved = Registry::load(config.output.registry_path.as_ref().unwrap())
            .unwrap()
            .unwrap();
        assert!(saved.contains_url("https://github.com/someone/found"));
    }

    #[tokio::test]
    async fn test_missing_page_still_saves_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let report = run_full_scan(&scanner(), &registry(), &config).await.unwrap();

        assert!(!report.html_updated);
        assert!(report.html_error.unwrap().contains("not found"));
        assert!(config.output.snapshot_path.exists());
    }

    #[tokio::test]
    async fn test_registry_write_failure_keeps_merged_registry() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        std::fs::write(&config.output.html_path, PAGE).unwrap();
        // a plain file where the registry's parent directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        config.output.registry_path = Some(blocker.join("registry.json"));

        let report = run_full_scan(&scanner(), &registry(), &config).await.unwrap();

        assert!(report.registry_error.is_some());
        assert!(report.html_updated);
        assert_eq!(report.added, 1);
        assert!(report.registry.contains_url("https://github.com/someone/found"));
    }
}
