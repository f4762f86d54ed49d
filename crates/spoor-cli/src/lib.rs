//! Spoor command-line driver.
//!
//! Feeds one seed value into an [`AccountFinder`], re-feeds every username
//! it derives, and prints each external account it reports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use spoor_cache::{Cache, MemoryCache, SqliteCache};
use spoor_core::{AppConfig, EventKind, FinderEvent};
use spoor_fetch::{FetchOptions, Fetcher, HttpFetcher};
use spoor_scanner::{AccountFinder, DISTRUST_CACHE_KEY};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Module name stamped on the seed event.
const SEED_MODULE: &str = "spoor_cli";

/// Kind of seed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedKind {
    /// A username, probed directly
    Username,
    /// An e-mail address
    Email,
    /// A person's full name
    Name,
    /// A domain name
    Domain,
}

impl From<SeedKind> for EventKind {
    fn from(kind: SeedKind) -> Self {
        match kind {
            SeedKind::Username => Self::Username,
            SeedKind::Email => Self::EmailAddr,
            SeedKind::Name => Self::HumanName,
            SeedKind::Domain => Self::DomainName,
        }
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "spoor", version)]
#[command(about = "Find accounts held by a username across public sites", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Value to investigate
    pub value: String,

    /// How to interpret the value
    #[arg(short, long, value_enum, default_value_t = SeedKind::Username)]
    pub kind: SeedKind,

    /// Configuration file (defaults to the XDG config path)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of probes in flight
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Keep the catalog and calibration in memory only
    #[arg(long)]
    pub no_cache: bool,

    /// Discard the cached distrust state and calibrate again
    #[arg(long)]
    pub recalibrate: bool,

    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Initialize tracing subscriber for logging
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "info,spoor=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolve configuration from `--config` or the default path, then apply
/// environment and command-line overrides.
pub fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };

    config.apply_env();
    if let Some(max_workers) = args.max_workers {
        config.probing.max_workers = max_workers;
    }
    config.validate().context("invalid configuration")?;

    Ok(config)
}

/// Open the persistent cache, or an in-memory one with `no_cache`.
pub async fn open_cache(config: &AppConfig, no_cache: bool) -> Result<Arc<dyn Cache>> {
    if no_cache {
        return Ok(Arc::new(MemoryCache::new()));
    }

    let path = config
        .cache_db_path()
        .context("failed to resolve cache path")?;
    debug!(path = %path.display(), "opening cache");

    let cache = SqliteCache::open(&path)
        .await
        .with_context(|| format!("failed to open cache at {}", path.display()))?;
    Ok(Arc::new(cache))
}

/// Render an emitted event for output, or `None` if it is not printed.
#[must_use]
pub fn render(event: &FinderEvent, json: bool) -> Option<String> {
    if json {
        let record = serde_json::json!({
            "kind": event.kind,
            "value": event.data,
            "source": event.source.as_ref().map(|source| source.data.as_str()),
        });
        return Some(record.to_string());
    }

    match event.kind {
        EventKind::Username => Some(format!("[username] {}", event.data)),
        EventKind::AccountExternalOwned => Some(format!("[account] {}", event.data.replace('\n', " "))),
        _ => None,
    }
}

/// Run a search to completion.
pub async fn run(args: Args) -> Result<()> {
    info!("Starting Spoor v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let cache = open_cache(&config, args.no_cache).await?;

    if args.recalibrate {
        cache
            .invalidate(DISTRUST_CACHE_KEY)
            .await
            .context("failed to discard distrust state")?;
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(&FetchOptions::from(&config.probing))
            .context("failed to build HTTP client")?,
    );
    let feed_fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(&FetchOptions::for_feed(&config.probing))
            .context("failed to build feed HTTP client")?,
    );

    let mut finder = AccountFinder::setup(&config, cache, fetcher, feed_fetcher)
        .await
        .context("failed to set up account finder")?;
    if finder.is_failed() {
        anyhow::bail!("site catalog unavailable");
    }

    let seed = FinderEvent::new(args.kind.into(), args.value, SEED_MODULE);
    let mut pending = VecDeque::from([Arc::new(seed)]);
    let mut accounts = 0usize;

    while let Some(event) = pending.pop_front() {
        for produced in finder.handle_event(event).await {
            if let Some(line) = render(&produced, args.json) {
                println!("{line}");
            }

            match produced.kind {
                EventKind::Username => pending.push_back(Arc::new(produced)),
                EventKind::AccountExternalOwned => accounts += 1,
                _ => {}
            }
        }
    }

    info!(accounts, "search finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["spoor", "jdoe"]).expect("parse args");
        assert_eq!(args.value, "jdoe");
        assert_eq!(args.kind, SeedKind::Username);
        assert!(!args.no_cache);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_kind_and_flags() {
        let args = Args::try_parse_from([
            "spoor",
            "jane@example.com",
            "--kind",
            "email",
            "--max-workers",
            "8",
            "--no-cache",
            "--json",
            "--recalibrate",
        ])
        .expect("parse args");

        assert_eq!(EventKind::from(args.kind), EventKind::EmailAddr);
        assert_eq!(args.max_workers, Some(8));
        assert!(args.no_cache && args.json && args.recalibrate);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(Args::try_parse_from(["spoor", "x", "--kind", "phone"]).is_err());
    }

    #[test]
    fn test_load_config_applies_cli_override() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probing]\nmax_workers = 10\n").expect("write config");

        let args = Args::try_parse_from([
            "spoor",
            "jdoe",
            "--config",
            path.to_str().expect("utf-8 path"),
            "--max-workers",
            "3",
        ])
        .expect("parse args");

        let config = load_config(&args).expect("load config");
        assert_eq!(config.probing.max_workers, 3);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args::try_parse_from(["spoor", "jdoe", "--config", "/nonexistent/spoor.toml"])
            .expect("parse args");
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_render_plain() {
        let account = FinderEvent::new(
            EventKind::AccountExternalOwned,
            "GitHub (Category: coding)\nhttps://github.com/jdoe",
            "spoor_accounts",
        );
        assert_eq!(
            render(&account, false).as_deref(),
            Some("[account] GitHub (Category: coding) https://github.com/jdoe")
        );

        let email = FinderEvent::new(EventKind::EmailAddr, "a@b.c", "spoor_cli");
        assert_eq!(render(&email, false), None);
    }

    #[test]
    fn test_render_json() {
        let source = Arc::new(FinderEvent::new(EventKind::Username, "jdoe", "spoor_cli"));
        let account = FinderEvent::derived(
            EventKind::AccountExternalOwned,
            "GitHub (Category: coding)\nhttps://github.com/jdoe",
            "spoor_accounts",
            source,
        );

        let line = render(&account, true).expect("json line");
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value["kind"], "ACCOUNT_EXTERNAL_OWNED");
        assert_eq!(value["source"], "jdoe");
    }

    #[tokio::test]
    async fn test_no_cache_uses_memory() {
        let cache = open_cache(&AppConfig::default(), true)
            .await
            .expect("open cache");
        cache.put("k", "v").await.expect("put");
        assert!(cache
            .get("k", std::time::Duration::from_secs(60))
            .await
            .expect("get")
            .is_some());
    }

    #[tokio::test]
    async fn test_configured_cache_path_is_created() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = AppConfig::default();
        config.cache.path = Some(dir.path().join("nested").join("cache.db"));

        open_cache(&config, false).await.expect("open cache");
        assert!(dir.path().join("nested").join("cache.db").exists());
    }
}
