use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use repowatch_core::{
    providers::GitHubProvider, run_full_scan, Config, Registry, ScanOptions, ScanReport, Scanner,
};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const RULE: &str = "======================================================================";

/// Longest accepted scan interval, one year
const MAX_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Parser)]
#[command(name = "repowatch")]
#[command(version, about = "Watch a list of GitHub repositories and keep a tracker page current", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub token; overrides the config file
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run one full scan and update the page
    Scan {
        /// Only check known repositories
        #[arg(long)]
        no_search: bool,
    },
    /// Scan now, then again on a fixed interval
    Schedule {
        #[arg(long)]
        interval_hours: Option<u64>,
        /// Also write logs here
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let path = config_path(&cli)?;
    let mut config = load_config(&path, cli.token.as_deref())?;

    match cli.command {
        Commands::Scan { no_search } => {
            init_tracing(None)?;
            if no_search {
                config.scan.search_for_new = false;
            }
            scan_once(&config).await
        }
        Commands::Schedule {
            interval_hours,
            log_file,
        } => {
            if let Some(hours) = interval_hours {
                config.schedule.interval_hours = hours;
            }
            if let Some(file) = log_file {
                config.schedule.log_file = file;
            }
            init_tracing(Some(&config.schedule.log_file))?;
            schedule(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::InitConfig { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::ShowConfig => {
            // never echo the token
            config.github.token = config.github.token.map(|_| "<set>".to_string());
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Console logging, plus an ANSI-free copy in `log_file` when given
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "repowatch=info".into()))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::config_path()?),
    }
}

/// File (or defaults), then the token from the command line or environment
fn load_config(path: &Path, token: Option<&str>) -> anyhow::Result<Config> {
    let mut config =
        Config::load_from(path).with_context(|| format!("Failed to load {}", path.display()))?;

    if let Some(token) = token {
        config.github.token = Some(token.to_string());
    }

    Ok(config)
}

fn load_registry(config: &Config) -> anyhow::Result<Registry> {
    let registry = match &config.output.registry_path {
        Some(path) => Registry::load_seeded(path, config.seed_registry())?,
        None => config.seed_registry(),
    };
    Ok(registry)
}

fn build_scanner(config: &Config) -> anyhow::Result<Scanner<GitHubProvider>> {
    let provider = GitHubProvider::from_config(&config.github)?;
    Ok(Scanner::new(provider, ScanOptions::from(&config.scan)))
}

async fn scan_once(config: &Config) -> anyhow::Result<ExitCode> {
    let registry = load_registry(config)?;
    let scanner = build_scanner(config)?;

    let report = run_full_scan(&scanner, &registry, config).await?;
    print_summary(&report, config);

    Ok(if report.html_updated {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run immediately, then every `interval_hours` until Ctrl-C
async fn schedule(config: &Config) -> anyhow::Result<()> {
    let hours = config.schedule.interval_hours.clamp(1, MAX_INTERVAL_HOURS);
    let run_timeout = Duration::from_secs(config.schedule.run_timeout_secs);

    println!("{RULE}");
    println!("🤖 REPOWATCH - AUTOMATED GITHUB SCANNER");
    println!("{RULE}");
    println!("📅 Scan Interval: Every {hours} hours");
    println!("📝 Log File: {}", config.schedule.log_file.display());
    println!("{RULE}");
    println!();

    let scanner = build_scanner(config)?;
    let mut registry = load_registry(config)?;

    let mut ticker = tokio::time::interval(tick_period(hours));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }

        tracing::info!("starting scheduled scan");
        let run = tokio::time::timeout(run_timeout, run_full_scan(&scanner, &registry, config));

        let finished = tokio::select! {
            outcome = run => Some(outcome),
            _ = &mut shutdown => None,
        };

        match finished {
            Some(Ok(Ok(report))) => {
                tracing::info!(
                    active = report.snapshot.active_repos,
                    new = report.snapshot.new_repos,
                    html_updated = report.html_updated,
                    "scan completed"
                );
                if let Some(e) = &report.registry_error {
                    tracing::warn!(error = %e, "registry not persisted, keeping it in memory");
                }
                registry = report.registry;
            }
            Some(Ok(Err(e))) => tracing::error!(error = %e, "scan failed"),
            Some(Err(_)) => {
                let e = repowatch_core::Error::Timeout(run_timeout.as_secs());
                tracing::error!(error = %e, "scan abandoned");
            }
            None => break,
        }

        tracing::info!("next scan in {hours} hours");
    }

    tracing::info!("scheduler stopped");
    println!("\nScheduler stopped.");
    Ok(())
}

/// Interval between scheduled scans, kept within `1..=MAX_INTERVAL_HOURS`
fn tick_period(hours: u64) -> Duration {
    let hours = hours.clamp(1, MAX_INTERVAL_HOURS);
    Duration::from_secs(hours.saturating_mul(3600))
}

fn print_summary(report: &ScanReport, config: &Config) {
    let snapshot = &report.snapshot;

    println!("\n{RULE}");
    println!("📊 SCAN SUMMARY");
    println!("{RULE}");
    println!(
        "  Scan Time: {}",
        snapshot
            .scan_time
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Known Repos Scanned: {}", report.known_scanned());
    println!("  Active Repositories: {}", snapshot.active_repos);
    println!("  Removed Repositories: {}", snapshot.removed_repos);
    println!("  Failed Checks: {}", snapshot.error_repos);
    println!("  New Repos Found: {}", snapshot.new_repos);
    println!("  Results: {}", config.output.snapshot_path.display());
    match &report.html_error {
        None => println!("  HTML Updated: ✅ Yes"),
        Some(e) => println!("  HTML Updated: ❌ Failed ({e})"),
    }
    if let Some(e) = &report.registry_error {
        println!("  Registry Saved: ❌ Failed ({e})");
    }
    println!("{RULE}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_schedule_flags() {
        let cli = Cli::try_parse_from([
            "repowatch",
            "schedule",
            "--interval-hours",
            "2",
            "--log-file",
            "scan.log",
        ])
        .unwrap();

        match cli.command {
            Commands::Schedule {
                interval_hours,
                log_file,
            } => {
                assert_eq!(interval_hours, Some(2));
                assert_eq!(log_file, Some(PathBuf::from("scan.log")));
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_token_flag_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "repowatch",
            "--config",
            path.to_str().unwrap(),
            "--token",
            "abc",
            "scan",
            "--no-search",
        ])
        .unwrap();

        let config = load_config(&config_path(&cli).unwrap(), cli.token.as_deref()).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("abc"));
        assert!(matches!(cli.command, Commands::Scan { no_search: true }));
    }

    #[test]
    fn test_registry_file_picks_up_new_config_repositories() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        let path = dir.path().join("registry.json");
        config.output.registry_path = Some(path.clone());
        config.seed_registry().save(&path).unwrap();

        config.repositories.push(repowatch_core::RepositoryRecord::new(
            "https://github.com/added/later",
            "later",
            "added after the first run",
            repowatch_core::Category::Archive,
        ));

        let registry = load_registry(&config).unwrap();
        assert_eq!(registry.len(), config.repositories.len());
        assert!(registry.contains_url("https://github.com/added/later"));
    }

    #[test]
    fn test_tick_period_is_bounded() {
        assert_eq!(tick_period(0), Duration::from_secs(3600));
        assert_eq!(tick_period(6), Duration::from_secs(6 * 3600));
        assert_eq!(
            tick_period(u64::MAX),
            Duration::from_secs(MAX_INTERVAL_HOURS * 3600)
        );
    }
}
