//! HTTP client wrapper with retry logic.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::{FeedsConfig, RetryConfig};

/// Errors from the live market-data API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("response decode error: {0}")]
    Decode(String),

    /// Credentials were rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Upstream rate limit hit and retries exhausted.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested wait before retrying.
        retry_after_secs: u64,
    },

    /// Retryable failures persisted past the attempt budget.
    #[error("max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made.
        attempts: u32,
    },

    /// Upstream returned a non-retryable error status.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },
}

/// HTTP client for the market-data API with retry logic.
///
/// Authentication is an `apikey` query parameter appended to every request.
#[derive(Debug, Clone)]
pub struct MarketDataHttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry_config: RetryConfig,
}

impl MarketDataHttpClient {
    /// Create a new HTTP client from feed config.
    pub fn new(config: &FeedsConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// Make a GET request, retrying transient failures with backoff.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let request = self.client.get(&url).query(&[("apikey", &self.api_key)]);

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ApiError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                if text.is_empty() {
                    return serde_json::from_str("null").map_err(|e| ApiError::Decode(e.to_string()));
                }
                return serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = retry_after
                        .map(Duration::from_secs)
                        .or_else(|| backoff.next_backoff());
                    if let Some(delay) = delay {
                        tracing::warn!(
                            delay_ms = delay.as_millis(),
                            "rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ApiError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            status = status.as_u16(),
                            delay_ms = delay.as_millis(),
                            "retryable upstream error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ApiError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(ApiError::AuthenticationFailed)
                        }
                        _ => Err(ApiError::Api {
                            status: status.as_u16(),
                            message: error_body,
                        }),
                    };
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}
