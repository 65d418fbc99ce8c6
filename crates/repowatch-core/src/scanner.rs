use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    config::ScanConfig,
    discovery,
    models::{RepoStatus, RepositoryRecord, ScanEntry},
    registry::Registry,
    resolver,
    snapshot::ScanSnapshot,
    source::RepositorySource,
};

/// Knobs for a single scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub query: String,
    pub max_results: u32,
    /// Sleep between known-repository checks
    pub request_delay: Duration,
    pub search_for_new: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            query: config.query.clone(),
            max_results: config.max_results,
            request_delay: Duration::from_millis(config.request_delay_ms),
            search_for_new: config.search_for_new,
        }
    }
}

/// What a scan hands back to its caller
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub snapshot: ScanSnapshot,
    /// Discovered repositories, ready to merge into the registry
    pub discovered: Vec<RepositoryRecord>,
}

/// Runs known-repository checks and discovery against a source.
///
/// Strictly sequential: one request in flight at a time.
pub struct Scanner<S> {
    source: S,
    options: ScanOptions,
}

impl<S: RepositorySource> Scanner<S> {
    pub fn new(source: S, options: ScanOptions) -> Self {
        Self { source, options }
    }

    /// Check every known repository, pausing between (not after) requests
    pub async fn scan_known(&self, registry: &Registry) -> Vec<ScanEntry> {
        info!(count = registry.len(), "scanning known repositories");
        let mut results = Vec::with_capacity(registry.len());

        for (i, record) in registry.repos().iter().enumerate() {
            if i > 0 && !self.options.request_delay.is_zero() {
                tokio::time::sleep(self.options.request_delay).await;
            }

            let entry = resolver::check_repository(&self.source, record, Utc::now()).await;
            log_entry(&entry);
            results.push(entry);
        }

        results
    }

    pub async fn discover(&self, registry: &Registry, now: DateTime<Utc>) -> Vec<ScanEntry> {
        discovery::search_new_repos(
            &self.source,
            &self.options.query,
            self.options.max_results,
            registry,
            now,
        )
        .await
    }

    /// Full scan: known repositories, then discovery, then aggregation
    pub async fn scan(&self, registry: &Registry) -> ScanOutcome {
        let known = self.scan_known(registry).await;

        let found = if self.options.search_for_new {
            self.discover(registry, Utc::now()).await
        } else {
            Vec::new()
        };

        for entry in &found {
            info!(
                repo = %entry.record.full_name(),
                stars = entry.metadata().map(|m| m.stars).unwrap_or(0),
                freshness = entry.freshness.as_ref().map(|f| f.badge.as_str()).unwrap_or(""),
                "new repository found"
            );
        }

        let discovered = found.iter().map(|e| e.record.clone()).collect();
        let snapshot = ScanSnapshot::aggregate(known, found, Utc::now());

        ScanOutcome {
            snapshot,
            discovered,
        }
    }
}

fn log_entry(entry: &ScanEntry) {
    let name = entry.record.name.as_str();
    match &entry.status {
        RepoStatus::Active(meta) => info!(
            repo = name,
            stars = meta.stars,
            updated = entry.freshness.as_ref().map(|f| f.badge.as_str()).unwrap_or("Unknown"),
            "active"
        ),
        RepoStatus::Removed { .. } => warn!(repo = name, "removed - repository no longer accessible"),
        RepoStatus::Error { error } => warn!(repo = name, %error, "check failed"),
    }
}
