//! Corporate-actions adapter.
//!
//! Four feeds per instrument, fetched concurrently. Each sub-fetch degrades
//! independently to an empty list on failure; a dead dividends endpoint must
//! not cost us the earnings calendar. The merger feed is global, so its
//! result is filtered down to the instrument's symbol.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::application::ports::{
    CorporateActionBundle, CorporateActionsSource, RawDividend, RawEarnings, RawMerger, RawSplit,
};
use crate::domain::Instrument;

use super::client::MarketDataHttpClient;

/// Corporate actions backed by the live per-symbol and global deal feeds.
pub struct ApiCorporateActionsSource {
    client: Arc<MarketDataHttpClient>,
}

impl ApiCorporateActionsSource {
    /// Create a corporate-actions adapter.
    #[must_use]
    pub const fn new(client: Arc<MarketDataHttpClient>) -> Self {
        Self { client }
    }

    /// Fetch one feed, degrading to empty on failure.
    async fn fetch_feed<T: DeserializeOwned>(&self, feed: &str, path: &str, symbol: &str) -> Vec<T> {
        match self.client.get::<Vec<T>>(path).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(
                    symbol = symbol,
                    feed = feed,
                    error = %error,
                    "corporate-action feed failed, defaulting to empty"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl CorporateActionsSource for ApiCorporateActionsSource {
    async fn fetch(&self, instrument: &Instrument) -> CorporateActionBundle {
        let symbol = instrument.symbol.as_str();

        let dividends_path = format!("/historical/stock_dividend/{symbol}");
        let earnings_path = format!("/historical/earnings_calendar/{symbol}");
        let splits_path = format!("/stock_split_calendar/{symbol}");

        let (dividends, earnings, splits, mergers) = tokio::join!(
            self.fetch_feed::<RawDividend>(
                "dividends",
                &dividends_path,
                symbol,
            ),
            self.fetch_feed::<RawEarnings>(
                "earnings",
                &earnings_path,
                symbol,
            ),
            self.fetch_feed::<RawSplit>(
                "splits",
                &splits_path,
                symbol,
            ),
            self.fetch_feed::<RawMerger>("mergers", "/merger_acquisition", symbol),
        );

        CorporateActionBundle {
            dividends,
            earnings,
            splits,
            // The deal feed is global; keep only this instrument's deals.
            mergers: mergers
                .into_iter()
                .filter(|m| m.symbol.as_deref() == Some(symbol))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedsConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source(server: &MockServer) -> ApiCorporateActionsSource {
        let config = FeedsConfig {
            base_url: server.uri(),
            api_key: "k".to_string(),
            ..FeedsConfig::default()
        };
        ApiCorporateActionsSource::new(Arc::new(MarketDataHttpClient::new(&config).unwrap()))
    }

    #[tokio::test]
    async fn bundles_all_four_feeds_and_filters_mergers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical/stock_dividend/TSLA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2025-05-02", "dividend": 0.25}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/historical/earnings_calendar/TSLA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2025-04-22", "eps": 1.1, "epsEstimated": 0.9}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stock_split_calendar/TSLA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/merger_acquisition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2025-02-10", "symbol": "TSLA", "title": "Deal A"},
                {"date": "2025-02-11", "symbol": "AAPL", "title": "Deal B"}
            ])))
            .mount(&server)
            .await;

        let bundle = source(&server).await.fetch(&Instrument::new("TSLA", "USD")).await;

        assert_eq!(bundle.dividends.len(), 1);
        assert_eq!(bundle.earnings.len(), 1);
        assert!(bundle.splits.is_empty());
        assert_eq!(bundle.mergers.len(), 1);
        assert_eq!(bundle.mergers[0].title.as_deref(), Some("Deal A"));
    }

    #[tokio::test]
    async fn one_failing_feed_does_not_affect_siblings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical/stock_dividend/TSLA"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/historical/earnings_calendar/TSLA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"date": "2025-04-22", "eps": 1.1, "epsEstimated": 0.9}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stock_split_calendar/TSLA"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/merger_acquisition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let bundle = source(&server).await.fetch(&Instrument::new("TSLA", "USD")).await;

        assert!(bundle.dividends.is_empty());
        assert_eq!(bundle.earnings.len(), 1);
        assert!(bundle.splits.is_empty());
        assert!(bundle.mergers.is_empty());
    }
}
