// ABOUTME: Agent configuration - cache, rate limit, timeout and batch settings.
// ABOUTME: Loads from TOML with AGENT_* environment overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables recognized by every agent.
///
/// Durations are stored as milliseconds so the TOML form stays flat:
///
/// ```toml
/// cache_ttl_ms = 300000
/// rate_limit_window_ms = 60000
/// rate_limit_max = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// How long a cached result stays valid.
    pub cache_ttl_ms: u64,

    /// Maximum cached entries before LRU eviction. Zero means unbounded.
    pub cache_max_entries: usize,

    /// Purge expired cache entries on this interval, if set.
    pub cache_sweep_interval_ms: Option<u64>,

    /// Length of the sliding rate-limit window.
    pub rate_limit_window_ms: u64,

    /// Admissions allowed within one window.
    pub rate_limit_max: usize,

    /// Timeout handed to the executor for single requests.
    pub tool_timeout_ms: u64,

    /// Executions allowed in flight at once.
    pub max_concurrent: usize,

    /// Worker bound for parallel batches.
    pub batch_concurrency: usize,

    /// Per-item timeout for batch fan-out.
    pub batch_item_timeout_ms: u64,

    /// Capacity of the inbound signal channel.
    pub mailbox_capacity: usize,

    /// Notifications buffered for the stream reader. Further notifications
    /// are dropped while the buffer is full.
    pub notification_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 300_000,
            cache_max_entries: 1024,
            cache_sweep_interval_ms: None,
            rate_limit_window_ms: 60_000,
            rate_limit_max: 60,
            tool_timeout_ms: 30_000,
            max_concurrent: 1,
            batch_concurrency: 4,
            batch_item_timeout_ms: 30_000,
            mailbox_capacity: 256,
            notification_capacity: 1024,
        }
    }
}

impl AgentConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Override fields from `AGENT_*` environment variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields using an arbitrary variable lookup.
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
                var: var.to_string(),
                reason: e.to_string(),
            })
        }

        if let Some(v) = lookup("AGENT_CACHE_TTL_MS") {
            self.cache_ttl_ms = parse("AGENT_CACHE_TTL_MS", &v)?;
        }
        if let Some(v) = lookup("AGENT_CACHE_MAX_ENTRIES") {
            self.cache_max_entries = parse("AGENT_CACHE_MAX_ENTRIES", &v)?;
        }
        if let Some(v) = lookup("AGENT_CACHE_SWEEP_INTERVAL_MS") {
            self.cache_sweep_interval_ms = Some(parse("AGENT_CACHE_SWEEP_INTERVAL_MS", &v)?);
        }
        if let Some(v) = lookup("AGENT_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit_window_ms = parse("AGENT_RATE_LIMIT_WINDOW_MS", &v)?;
        }
        if let Some(v) = lookup("AGENT_RATE_LIMIT_MAX") {
            self.rate_limit_max = parse("AGENT_RATE_LIMIT_MAX", &v)?;
        }
        if let Some(v) = lookup("AGENT_TOOL_TIMEOUT_MS") {
            self.tool_timeout_ms = parse("AGENT_TOOL_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("AGENT_MAX_CONCURRENT") {
            self.max_concurrent = parse("AGENT_MAX_CONCURRENT", &v)?;
        }
        if let Some(v) = lookup("AGENT_BATCH_CONCURRENCY") {
            self.batch_concurrency = parse("AGENT_BATCH_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("AGENT_BATCH_ITEM_TIMEOUT_MS") {
            self.batch_item_timeout_ms = parse("AGENT_BATCH_ITEM_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("AGENT_MAILBOX_CAPACITY") {
            self.mailbox_capacity = parse("AGENT_MAILBOX_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("AGENT_NOTIFICATION_CAPACITY") {
            self.notification_capacity = parse("AGENT_NOTIFICATION_CAPACITY", &v)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings the agent cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit_window_ms must be positive".into(),
            ));
        }
        if self.rate_limit_max == 0 {
            return Err(ConfigError::Invalid("rate_limit_max must be positive".into()));
        }
        if self.tool_timeout_ms == 0 {
            return Err(ConfigError::Invalid("tool_timeout_ms must be positive".into()));
        }
        if self.batch_item_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "batch_item_timeout_ms must be positive".into(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid("max_concurrent must be positive".into()));
        }
        if self.batch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "batch_concurrency must be positive".into(),
            ));
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid(
                "mailbox_capacity must be positive".into(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be positive".into(),
            ));
        }
        if self.cache_sweep_interval_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "cache_sweep_interval_ms must be positive when set".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn cache_sweep_interval(&self) -> Option<Duration> {
        self.cache_sweep_interval_ms.map(Duration::from_millis)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    pub fn batch_item_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_item_timeout_ms)
    }
}
