//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Refresh cadence, retry and cache lifetime settings
    #[serde(default)]
    pub caching: CachingConfig,

    /// Remote API endpoints
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub client: ClientConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override file values from `BESTSTORIES_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override values using an arbitrary key lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let caching = &mut self.caching;
        override_parsed(
            &lookup,
            "BESTSTORIES_REFRESH_INTERVAL_SECS",
            &mut caching.refresh_interval_secs,
        );
        override_parsed(
            &lookup,
            "BESTSTORIES_FULL_REFRESH_MINUTES",
            &mut caching.full_refresh_frequency_minutes,
        );
        override_parsed(
            &lookup,
            "BESTSTORIES_SNAPSHOT_TTL_MINUTES",
            &mut caching.snapshot_ttl_minutes,
        );
        override_parsed(
            &lookup,
            "BESTSTORIES_RETRY_ATTEMPTS",
            &mut caching.retry_attempts,
        );

        let client = &mut self.client;
        override_parsed(
            &lookup,
            "BESTSTORIES_MAX_CONCURRENT",
            &mut client.max_concurrent,
        );
        override_parsed(&lookup, "BESTSTORIES_TIMEOUT_SECS", &mut client.timeout_secs);

        if let Some(url) = lookup("BESTSTORIES_INDEX_URL") {
            self.source.index_url = url;
        }
        if let Some(url) = lookup("BESTSTORIES_ITEM_BASE_URL") {
            self.source.item_base_url = url;
        }
        if let Some(level) = lookup("BESTSTORIES_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.client.max_concurrent == 0 {
            return Err(AppError::validation("client.max_concurrent must be > 0"));
        }
        if self.caching.retry_attempts == 0 {
            return Err(AppError::validation("caching.retry_attempts must be > 0"));
        }
        if self.caching.retry_initial_backoff_ms > self.caching.retry_max_backoff_ms {
            return Err(AppError::validation(
                "caching.retry_initial_backoff_ms must not exceed caching.retry_max_backoff_ms",
            ));
        }
        url::Url::parse(&self.source.index_url)
            .map_err(|e| AppError::validation(format!("source.index_url: {e}")))?;
        url::Url::parse(&self.source.item_base_url)
            .map_err(|e| AppError::validation(format!("source.item_base_url: {e}")))?;
        Ok(())
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => log::warn!("Ignoring {}: cannot parse {:?}", key, raw),
        }
    }
}

/// Refresh cadence and cache lifetime settings.
///
/// Non-positive cadence and TTL values fall back to their defaults when
/// read through the accessor methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachingConfig {
    /// Periodic refresh cadence in seconds
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: i64,

    /// Full refresh cadence in minutes (five minutes are subtracted)
    #[serde(default = "defaults::full_refresh_frequency")]
    pub full_refresh_frequency_minutes: i64,

    /// How long a published snapshot counts as fresh
    #[serde(default = "defaults::snapshot_ttl")]
    pub snapshot_ttl_minutes: i64,

    /// Delay before the first periodic refresh
    #[serde(default = "defaults::warmup_delay")]
    pub warmup_delay_secs: u64,

    /// Attempts per full refresh
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Backoff after the first failed attempt; doubles per attempt
    #[serde(default = "defaults::retry_initial_backoff")]
    pub retry_initial_backoff_ms: u64,

    /// Upper bound on the backoff between attempts
    #[serde(default = "defaults::retry_max_backoff")]
    pub retry_max_backoff_ms: u64,
}

impl CachingConfig {
    /// Subtracted from the full refresh cadence to run ahead of upstream expiry.
    pub const FULL_REFRESH_LEAD_MINUTES: i64 = 5;

    /// Effective periodic refresh cadence.
    pub fn refresh_interval(&self) -> Duration {
        let secs = if self.refresh_interval_secs <= 0 {
            defaults::refresh_interval()
        } else {
            self.refresh_interval_secs
        };
        Duration::from_secs(secs as u64)
    }

    /// Effective full refresh cadence, never shorter than one minute.
    pub fn full_refresh_interval(&self) -> Duration {
        let minutes = if self.full_refresh_frequency_minutes <= 0 {
            defaults::full_refresh_frequency()
        } else {
            self.full_refresh_frequency_minutes
        };
        let minutes = (minutes - Self::FULL_REFRESH_LEAD_MINUTES).max(1);
        Duration::from_secs(minutes as u64 * 60)
    }

    /// Effective snapshot time-to-live.
    pub fn snapshot_ttl(&self) -> chrono::Duration {
        let minutes = if self.snapshot_ttl_minutes <= 0 {
            defaults::snapshot_ttl()
        } else {
            self.snapshot_ttl_minutes
        };
        chrono::Duration::minutes(minutes)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_secs(self.warmup_delay_secs)
    }
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: defaults::refresh_interval(),
            full_refresh_frequency_minutes: defaults::full_refresh_frequency(),
            snapshot_ttl_minutes: defaults::snapshot_ttl(),
            warmup_delay_secs: defaults::warmup_delay(),
            retry_attempts: defaults::retry_attempts(),
            retry_initial_backoff_ms: defaults::retry_initial_backoff(),
            retry_max_backoff_ms: defaults::retry_max_backoff(),
        }
    }
}

/// Remote API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL returning the ranked id list
    #[serde(default = "defaults::index_url")]
    pub index_url: String,

    /// Base URL that `{id}.json` is appended to
    #[serde(default = "defaults::item_base_url")]
    pub item_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: defaults::index_url(),
            item_base_url: defaults::item_base_url(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent item requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Caching defaults
    pub fn refresh_interval() -> i64 {
        180
    }
    pub fn full_refresh_frequency() -> i64 {
        720
    }
    pub fn snapshot_ttl() -> i64 {
        10
    }
    pub fn warmup_delay() -> u64 {
        180
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_initial_backoff() -> u64 {
        1_000
    }
    pub fn retry_max_backoff() -> u64 {
        30_000
    }

    // Source defaults
    pub fn index_url() -> String {
        "https://hacker-news.firebaseio.com/v0/beststories.json".into()
    }
    pub fn item_base_url() -> String {
        "https://hacker-news.firebaseio.com/v0/item/".into()
    }

    // Client defaults
    pub fn user_agent() -> String {
        "beststories/0.1".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        16
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
