//! Tracing Setup
//!
//! Console tracing with `EnvFilter`. `RUST_LOG` wins when set; otherwise the
//! configured default level applies.
//!
//! # Usage
//!
//! ```rust,ignore
//! use event_engine::config::LoggingConfig;
//! use event_engine::telemetry::init_tracing;
//!
//! init_tracing(&LoggingConfig::default());
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = match config.format.as_str() {
        "compact" => builder.compact().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}
