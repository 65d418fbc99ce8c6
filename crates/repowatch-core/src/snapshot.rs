use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    models::{RepoStatus, ScanEntry},
    Result,
};

/// Everything one scan produced, plus summary counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSnapshot {
    pub scan_time: DateTime<Utc>,
    pub total_repos: usize,
    pub active_repos: usize,
    pub removed_repos: usize,
    #[serde(default)]
    pub error_repos: usize,
    pub new_repos: usize,
    pub repositories: Vec<ScanEntry>,
}

impl ScanSnapshot {
    /// Known results followed by discoveries, counted in one pass
    pub fn aggregate(known: Vec<ScanEntry>, discovered: Vec<ScanEntry>, scan_time: DateTime<Utc>) -> Self {
        let mut repositories = known;
        repositories.extend(discovered);

        let mut active_repos = 0;
        let mut removed_repos = 0;
        let mut error_repos = 0;
        let mut new_repos = 0;

        for entry in &repositories {
            match entry.status {
                RepoStatus::Active(_) => active_repos += 1,
                RepoStatus::Removed { .. } => removed_repos += 1,
                RepoStatus::Error { .. } => error_repos += 1,
            }
            if entry.is_new {
                new_repos += 1;
            }
        }

        Self {
            scan_time,
            total_repos: repositories.len(),
            active_repos,
            removed_repos,
            error_repos,
            new_repos,
            repositories,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the whole snapshot, replacing whatever was there.
    ///
    /// Goes through a sibling temp file so readers never see half a snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, self.to_json()?)?;
        std::fs::rename(&tmp, path)?;

        info!(path = %path.display(), total = self.total_repos, "scan results saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
