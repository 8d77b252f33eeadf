//! Configuration module for the event engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before the engine starts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use event_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod calendar;
mod feeds;
mod observability;
mod persistence;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use calendar::CalendarConfig;
pub use feeds::{FeedsConfig, RetryConfig};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use persistence::PersistenceConfig;
pub use server::ServerConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Live market-data feed configuration.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Local economic-calendar extract configuration.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Event store configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable
/// interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    let mut result = input.to_string();
    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_match.as_str()) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match.as_str(), &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.feeds.max_concurrent_instruments == 0 {
        return Err(ConfigError::ValidationError(
            "feeds.max_concurrent_instruments must be at least 1".to_string(),
        ));
    }

    if config.feeds.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "feeds.timeout_secs must be positive".to_string(),
        ));
    }

    if config.feeds.retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "feeds.retry.multiplier must be at least 1.0".to_string(),
        ));
    }

    if config.persistence.database_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "persistence.database_url must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.http_port, 4000);
        assert_eq!(config.feeds.max_concurrent_instruments, 8);
        assert_eq!(config.persistence.database_url, "sqlite://events.db");
    }

    #[test]
    fn load_minimal_config() {
        let yaml = r"
server:
  http_port: 8080
";
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.server.http_port, 8080);
        // Everything else falls back to defaults.
        assert_eq!(config.feeds.max_concurrent_instruments, 8);
    }

    #[test]
    fn env_var_with_default_when_missing() {
        let input = "level: ${EVENT_ENGINE_TEST_NONEXISTENT_VAR:-info}";
        assert_eq!(interpolate_env_vars(input), "level: info");
    }

    #[test]
    fn env_var_without_default_becomes_empty() {
        let input = "api_key: ${EVENT_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "api_key: ");
    }

    #[test]
    fn validation_rejects_zero_concurrency() {
        let yaml = r"
feeds:
  max_concurrent_instruments: 0
";
        let result = load_config_from_string(yaml);
        let Err(err) = result else {
            panic!("expected error for zero concurrency cap");
        };
        assert!(err.to_string().contains("max_concurrent_instruments"));
    }

    #[test]
    fn full_config_parse() {
        let yaml = r#"
server:
  http_port: 4000
  bind_address: "127.0.0.1"

feeds:
  base_url: "https://example.test/api/v3"
  api_key: "test-key"
  timeout_secs: 10
  max_concurrent_instruments: 4
  universe: ["TSLA", "AAPL"]
  retry:
    max_attempts: 2
    initial_backoff_ms: 50
    max_backoff_ms: 500
    multiplier: 2.0

calendar:
  path: "data/economic_calendar.csv"

persistence:
  database_url: "sqlite://test.db"

observability:
  logging:
    level: "debug"
    format: "compact"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.feeds.universe, vec!["TSLA", "AAPL"]);
        assert_eq!(config.feeds.retry.max_attempts, 2);
        assert_eq!(config.calendar.path.as_deref(), Some("data/economic_calendar.csv"));
        assert_eq!(config.persistence.database_url, "sqlite://test.db");
        assert_eq!(config.observability.logging.level, "debug");
    }
}
