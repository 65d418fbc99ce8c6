use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{models::RepositoryRecord, Result};

/// The set of repositories checked on every scan.
///
/// Immutable: a scan reads it, and growing it produces a new value. URLs are
/// unique and insertion order is kept. Removed repositories stay in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RepositoryRecord>", into = "Vec<RepositoryRecord>")]
pub struct Registry {
    repos: Vec<RepositoryRecord>,
}

impl Registry {
    /// Build a registry, keeping the first record for any repeated URL
    pub fn new(repos: Vec<RepositoryRecord>) -> Self {
        let mut seen = HashSet::new();
        let repos = repos
            .into_iter()
            .filter(|r| seen.insert(r.url.clone()))
            .collect();
        Self { repos }
    }

    pub fn repos(&self) -> &[RepositoryRecord] {
        &self.repos
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.repos.iter().any(|r| r.url == url)
    }

    /// A new registry with `additions` appended; returns it with the number actually added
    pub fn merged(&self, additions: &[RepositoryRecord]) -> (Registry, usize) {
        let mut repos = self.repos.clone();
        let mut added = 0;

        for record in additions {
            if repos.iter().any(|r| r.url == record.url) {
                continue;
            }
            repos.push(record.clone());
            added += 1;
        }

        (Registry { repos }, added)
    }

    /// Read a registry file; `None` if it doesn't exist yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(path = %path.display(), "no registry file");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let registry: Registry = serde_json::from_str(&contents)?;
        Ok(Some(registry))
    }

    /// Load from `path` and append any `seed` records it doesn't have yet.
    ///
    /// With no file the seed is the registry.
    pub fn load_seeded(path: &Path, seed: Registry) -> Result<Self> {
        let registry = match Self::load(path)? {
            Some(saved) => {
                let (registry, added) = saved.merged(seed.repos());
                if added > 0 {
                    info!(added, "new seed repositories added to saved registry");
                }
                registry
            }
            None => seed,
        };
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), repos = self.len(), "registry saved");
        Ok(())
    }
}

impl From<Vec<RepositoryRecord>> for Registry {
    fn from(repos: Vec<RepositoryRecord>) -> Self {
        Self::new(repos)
    }
}

impl From<Registry> for Vec<RepositoryRecord> {
    fn from(registry: Registry) -> Self {
        registry.repos
    }
}
