//! Live macro-calendar adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{MacroCalendar, MacroFetch, RawMacroEvent};
use crate::application::services::normalizer::parse_event_date;

use super::api_types::ApiMacroRow;
use super::client::MarketDataHttpClient;

/// Macro calendar backed by the live economic-calendar endpoint.
pub struct ApiMacroCalendar {
    client: Arc<MarketDataHttpClient>,
}

impl ApiMacroCalendar {
    /// Create a live macro-calendar adapter.
    #[must_use]
    pub const fn new(client: Arc<MarketDataHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MacroCalendar for ApiMacroCalendar {
    async fn fetch(&self) -> MacroFetch {
        let rows: Vec<ApiMacroRow> = match self.client.get("/economic_calendar").await {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch live macro calendar");
                return MacroFetch::default();
            }
        };

        let mut fetch = MacroFetch::default();
        for row in rows {
            let Some(date) = row.date.filter(|d| parse_event_date(d).is_ok()) else {
                fetch.malformed_rows += 1;
                continue;
            };

            fetch.events.push(RawMacroEvent {
                date,
                event: row.event,
                currency: row.currency,
                impact: row.impact,
                importance: row.importance,
            });
        }

        if fetch.malformed_rows > 0 {
            tracing::warn!(
                count = fetch.malformed_rows,
                "live macro calendar rows had unparseable dates"
            );
        }

        fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedsConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn calendar(server: &MockServer) -> ApiMacroCalendar {
        let config = FeedsConfig {
            base_url: server.uri(),
            api_key: "k".to_string(),
            ..FeedsConfig::default()
        };
        ApiMacroCalendar::new(Arc::new(MarketDataHttpClient::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn fetch_counts_malformed_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/economic_calendar"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2025-03-14 12:30:00", "event": "CPI Release", "currency": "USD", "impact": "High"},
                {"date": "yesterday-ish", "event": "Broken", "currency": "USD"},
                {"event": "No Date", "currency": "USD"}
            ])))
            .mount(&server)
            .await;

        let fetch = calendar(&server).await.fetch().await;
        assert_eq!(fetch.events.len(), 1);
        assert_eq!(fetch.malformed_rows, 2);
        assert_eq!(fetch.events[0].event.as_deref(), Some("CPI Release"));
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_empty_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/economic_calendar"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let fetch = calendar(&server).await.fetch().await;
        assert!(fetch.events.is_empty());
        assert_eq!(fetch.malformed_rows, 0);
    }
}
