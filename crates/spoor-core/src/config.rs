//! Configuration management for Spoor.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Feed of site definitions probed by default.
pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/WebBreacher/WhatsMyName/master/web_accounts_list.json";

/// Usernames shared by many unrelated mailboxes and accounts.
const DEFAULT_GENERIC_USERS: &[&str] = &[
    "abuse",
    "admin",
    "billing",
    "compliance",
    "devnull",
    "dns",
    "ftp",
    "hostmaster",
    "inoc",
    "ispfeedback",
    "ispsupport",
    "list",
    "list-request",
    "maildaemon",
    "marketing",
    "noc",
    "no-reply",
    "noreply",
    "null",
    "peering",
    "peering-notify",
    "peering-request",
    "phish",
    "phishing",
    "postmaster",
    "privacy",
    "registrar",
    "registry",
    "root",
    "routing-registry",
    "rr",
    "sales",
    "security",
    "spam",
    "support",
    "sysadmin",
    "tech",
    "undisclosed-recipients",
    "unsubscribe",
    "usenet",
    "uucp",
    "webmaster",
    "www",
];

const DEFAULT_INTERNET_TLDS: &[&str] = &[
    "com", "net", "org", "info", "biz", "io", "dev", "app", "me", "co", "ai", "xyz", "edu",
    "gov", "de", "fr", "nl", "se", "no", "fi", "dk", "it", "es", "pl", "ru", "ch", "at", "be",
    "ca", "us", "uk", "co.uk", "org.uk", "ac.uk", "gov.uk", "au", "com.au", "net.au", "org.au",
    "nz", "co.nz", "jp", "co.jp", "br", "com.br", "in", "co.in", "cn", "com.cn",
];

/// Main application configuration.
///
/// This is loaded from `~/.config/spoor/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Probe behavior settings
    pub probing: ProbingConfig,
    /// Site catalog feed settings
    pub catalog: CatalogConfig,
    /// Distrust calibration settings
    pub calibration: CalibrationConfig,
    /// Identifier derivation and filtering settings
    pub identifiers: IdentifierConfig,
    /// Persistent cache settings
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to an already loaded config.
    ///
    /// Supports the following environment variables:
    /// - `SPOOR_MAX_WORKERS`: Override the probe worker limit
    /// - `SPOOR_FETCH_TIMEOUT_SECS`: Override the per-request timeout
    /// - `SPOOR_USER_AGENT`: Override the user agent sent with probes
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("SPOOR_MAX_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.probing.max_workers = workers;
                tracing::debug!("Override probing.max_workers from env: {}", workers);
            }
        }

        if let Ok(val) = std::env::var("SPOOR_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.probing.fetch_timeout_secs = secs;
                tracing::debug!("Override probing.fetch_timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("SPOOR_USER_AGENT") {
            if !val.is_empty() {
                tracing::debug!("Override probing.user_agent from env: {}", val);
                self.probing.user_agent = val;
            }
        }
    }

    /// Check values that would make probing impossible.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probing.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probing.fetch_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.catalog.feed_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "catalog.feed_url".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/spoor/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "spoor", "spoor").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the cache directory path.
    ///
    /// Uses XDG base directories: `~/.cache/spoor`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "spoor", "spoor").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.cache_dir().to_path_buf())
    }

    /// Resolve the cache database path, honoring `[cache] path`.
    pub fn cache_db_path(&self) -> ConfigResult<PathBuf> {
        match &self.cache.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::cache_dir()?.join("cache.db")),
        }
    }
}

/// Probe behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbingConfig {
    /// Maximum number of probes in flight at once
    pub max_workers: usize,
    /// Per-request timeout in seconds
    pub fetch_timeout_secs: u64,
    /// User agent string sent with every request
    pub user_agent: String,
    /// Whether to verify TLS certificates of probed sites
    pub verify_tls: bool,
    /// Require the probed page to mention the identifier
    pub must_mention_identifier: bool,
}

impl ProbingConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ProbingConfig {
    fn default() -> Self {
        Self {
            max_workers: 50,
            fetch_timeout_secs: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0"
                .to_string(),
            verify_tls: false,
            must_mention_identifier: true,
        }
    }
}

/// Hours as a `Duration`, saturating instead of overflowing.
fn hours(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(3600))
}

/// Site catalog feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// URL of the JSON site catalog
    pub feed_url: String,
    /// How long a fetched feed stays valid in the cache, in hours
    pub cache_hours: u64,
}

impl CatalogConfig {
    /// Feed validity window as a `Duration`.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        hours(self.cache_hours)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cache_hours: 48,
        }
    }
}

/// Distrust calibration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Whether to calibrate against a random identifier before scanning
    pub enabled: bool,
    /// How long a calibration result stays valid, in hours
    pub cache_hours: u64,
}

impl CalibrationConfig {
    /// Calibration validity window as a `Duration`.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        hours(self.cache_hours)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_hours: 72,
        }
    }
}

/// Identifier derivation and filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct IdentifierConfig {
    /// Derive usernames from e-mail local parts
    pub user_from_email: bool,
    /// Skip identifiers that are plain first names
    pub ignore_name_dict: bool,
    /// Skip identifiers that are dictionary words
    pub ignore_word_dict: bool,
    /// Usernames never worth probing
    pub generic_users: Vec<String>,
    /// Newline-separated first-name dictionary
    pub name_dict_path: Option<PathBuf>,
    /// Newline-separated word dictionary
    pub word_dict_path: Option<PathBuf>,
    /// Public suffixes used to find a domain's keyword
    pub internet_tlds: Vec<String>,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            user_from_email: true,
            ignore_name_dict: true,
            ignore_word_dict: true,
            generic_users: DEFAULT_GENERIC_USERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            name_dict_path: None,
            word_dict_path: None,
            internet_tlds: DEFAULT_INTERNET_TLDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Persistent cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file; defaults to `cache.db` in the XDG cache dir
    pub path: Option<PathBuf>,
}
