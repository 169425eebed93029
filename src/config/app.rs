//! Application configuration loading from a TOML file plus environment overrides.
//!
//! Every section has defaults, so an absent file yields a usable configuration.
//! Environment variables (optionally loaded from `.env`) take precedence over the
//! file so deployments can point the same build at a different backend.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/gymdesk.sqlite?mode=rwc";

/// Top-level configuration, mirroring the layout of `gymdesk.toml`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// REST backend settings
    #[serde(default)]
    pub api: ApiConfig,
    /// List query and cache settings
    #[serde(default)]
    pub query: QueryConfig,
    /// Search box settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Membership expiry settings
    #[serde(default)]
    pub membership: MembershipConfig,
    /// Connection string for durable client storage
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

/// REST backend settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// List query and cache settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueryConfig {
    /// Page size used when a list is first opened
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Age after which a cached page is refetched on read
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

/// Search box settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period before typed text is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Membership expiry settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MembershipConfig {
    /// Memberships ending within this many days are flagged as expiring soon
    #[serde(default = "default_expiring_threshold_days")]
    pub expiring_threshold_days: i64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_page_size() -> u32 {
    10
}

const fn default_stale_after_secs() -> u64 {
    30
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_expiring_threshold_days() -> i64 {
    7
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            expiring_threshold_days: default_expiring_threshold_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            query: QueryConfig::default(),
            search: SearchConfig::default(),
            membership: MembershipConfig::default(),
            database_url: default_database_url(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl QueryConfig {
    /// Cache freshness window as a [`Duration`]
    #[must_use]
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl SearchConfig {
    /// Debounce delay as a [`Duration`]
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    /// Applies environment overrides using the provided lookup.
    ///
    /// Recognised variables: `GYMDESK_API_URL`, `GYMDESK_API_TIMEOUT_SECS`, `DATABASE_URL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GYMDESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup("GYMDESK_API_TIMEOUT_SECS") {
            self.api.timeout_secs = raw.trim().parse().map_err(|e| Error::Config {
                message: format!("GYMDESK_API_TIMEOUT_SECS must be a whole number: {e}"),
            })?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        self.check()
    }

    fn check(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "api.base_url cannot be empty".to_string(),
            });
        }
        if self.query.default_page_size == 0 {
            return Err(Error::Config {
                message: "query.default_page_size must be at least 1".to_string(),
            });
        }
        if self.membership.expiring_threshold_days < 0 {
            return Err(Error::Config {
                message: "membership.expiring_threshold_days cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses a configuration document.
///
/// # Errors
/// Returns `Error::Config` when the TOML is malformed or a value is out of range.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse configuration: {e}"),
    })?;
    config.check()?;
    Ok(config)
}

/// Loads configuration from a TOML file, falling back to defaults when the file is absent.
///
/// Environment overrides are not applied here; see [`load_app_configuration`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    match std::fs::read_to_string(path_ref) {
        Ok(contents) => parse_config(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No configuration file at {:?}, using defaults", path_ref);
            Ok(AppConfig::default())
        }
        Err(e) => Err(Error::Config {
            message: format!("Failed to read config file {}: {e}", path_ref.display()),
        }),
    }
}

/// Loads `.env`, the configuration file, and process environment overrides, in that order.
pub fn load_app_configuration<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    if dotenvy::dotenv().is_err() {
        tracing::debug!("No .env file loaded; relying on process environment");
    }
    let mut config = load_config(path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    tracing::info!(
        api = %config.api.base_url,
        page_size = config.query.default_page_size,
        "Configuration loaded"
    );
    Ok(config)
}
