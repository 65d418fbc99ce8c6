use repowatch_api::github::{DEFAULT_TIMEOUT_SECS, GITHUB_API_BASE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    models::{Category, RepositoryRecord},
    registry::Registry,
    splice::RegionMarkers,
};

/// Main configuration structure
///
/// Loaded from a TOML file; CLI flags and env vars are layered on top by the
/// binary. Priority: CLI > Env > File > Defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub template: RegionMarkers,
    /// Seed list of tracked repositories
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryRecord>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            scan: ScanConfig::default(),
            output: OutputConfig::default(),
            schedule: ScheduleConfig::default(),
            template: RegionMarkers::default(),
            repositories: default_repositories(),
        }
    }
}

impl Config {
    /// Load config from `path`; a missing file means defaults
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get the config file path (XDG on Linux/macOS, AppData on Windows)
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("repowatch");

        Ok(config_dir.join("config.toml"))
    }

    /// The configured repositories as a registry
    pub fn seed_registry(&self) -> Registry {
        Registry::new(self.repositories.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token; raises the API rate limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_github_url() -> String {
    GITHUB_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Keyword query for discovering new repositories
    #[serde(default = "default_query")]
    pub query: String,

    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Pause between known-repository checks
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_search_for_new")]
    pub search_for_new: bool,
}

fn default_query() -> String {
    "epstein files".to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_request_delay_ms() -> u64 {
    1000 // stay well under the unauthenticated rate limit
}

fn default_search_for_new() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            max_results: default_max_results(),
            request_delay_ms: default_request_delay_ms(),
            search_for_new: default_search_for_new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default = "default_html_path")]
    pub html_path: PathBuf,

    /// Where discovered repositories are remembered between runs.
    /// Unset means the registry only lives in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("github_scan_results.json")
}

fn default_html_path() -> PathBuf {
    PathBuf::from("epstein-files-tracker-v2.html")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            html_path: default_html_path(),
            registry_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// A run still going after this long is abandoned
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_interval_hours() -> u64 {
    6
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_log_file() -> PathBuf {
    PathBuf::from("scanner_log.txt")
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            run_timeout_secs: default_run_timeout_secs(),
            log_file: default_log_file(),
        }
    }
}

fn default_repositories() -> Vec<RepositoryRecord> {
    vec![
        RepositoryRecord::new(
            "https://github.com/epstein-docs/epstein-docs.github.io",
            "epstein-docs",
            "8,175+ processed documents with OCR and AI analysis",
            Category::Archive,
        )
        .with_website("https://epstein-docs.github.io/"),
        RepositoryRecord::new(
            "https://github.com/theelderemo/FULL_EPSTEIN_INDEX",
            "FULL_EPSTEIN_INDEX",
            "Comprehensive unified research archive with House Oversight + DOJ releases",
            Category::Index,
        ),
        RepositoryRecord::new(
            "https://github.com/ErikVeland/epstein-archive",
            "epstein-archive",
            "Document processing system with spice ratings and entity extraction",
            Category::Analysis,
        ),
        RepositoryRecord::new(
            "https://github.com/maxandrews/Epstein-doc-explorer",
            "Epstein-doc-explorer",
            "Graph explorer of Epstein emails with network visualization",
            Category::Visualization,
        ),
        RepositoryRecord::new(
            "https://github.com/yung-megafone/Epstein-Files",
            "Epstein-Files-Mirror",
            "Mirror of magnet links for Jan 30, 2026 DOJ release (300GB+)",
            Category::Torrents,
        ),
        RepositoryRecord::new(
            "https://github.com/paulgp/epstein-document-search",
            "epstein-document-search",
            "Searchable database using Meilisearch for full-text search",
            Category::Search,
        ),
        RepositoryRecord::new(
            "https://github.com/theelderemo/Epstein-files",
            "Epstein-files-dataset",
            "25,000+ text files from Nov 2025 House Oversight release",
            Category::Dataset,
        ),
    ]
}
