// Scanning, classification and page generation - everything between the API and the CLI
pub mod config;
pub mod discovery;
pub mod error;
pub mod freshness;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod scanner;
pub mod snapshot;
pub mod source;
pub mod splice;

pub use config::Config;
pub use error::Error;
pub use freshness::{Freshness, FreshnessClass, UNKNOWN_AGE_DAYS};
pub use models::{Category, RepoMetadata, RepoStatus, RepositoryRecord, ScanEntry};
pub use pipeline::{run_full_scan, ScanReport};
pub use registry::Registry;
pub use scanner::{ScanOptions, ScanOutcome, Scanner};
pub use snapshot::ScanSnapshot;
pub use source::RepositorySource;
pub use splice::RegionMarkers;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
