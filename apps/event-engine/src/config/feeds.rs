//! Live market-data feed configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the live market-data API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Base URL of the market-data API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key, sent as the `apikey` query parameter.
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Symbols to restrict the instrument directory to. Empty means the
    /// whole universe the upstream reports.
    #[serde(default)]
    pub universe: Vec<String>,
    /// Cap on instruments fetching corporate actions concurrently.
    #[serde(default = "default_max_concurrent_instruments")]
    pub max_concurrent_instruments: usize,
    /// Retry behavior for transient upstream failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FeedsConfig {
    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            universe: Vec::new(),
            max_concurrent_instruments: default_max_concurrent_instruments(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry behavior for the HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor per attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl RetryConfig {
    /// First backoff delay as a [`Duration`].
    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Backoff ceiling as a [`Duration`].
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_base_url() -> String {
    "https://financialmodelingprep.com/api/v3".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_max_concurrent_instruments() -> usize {
    8
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    250
}

const fn default_max_backoff_ms() -> u64 {
    5_000
}

const fn default_multiplier() -> f64 {
    2.0
}
