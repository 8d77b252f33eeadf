//! Live instrument directory adapter.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::InstrumentDirectory;
use crate::domain::{Instrument, Symbol};

use super::api_types::StockListing;
use super::client::MarketDataHttpClient;

/// Instrument directory backed by the live stock listing endpoint.
///
/// A non-empty universe restricts the directory to the named symbols; the
/// upstream listing is large and most deployments only track a handful.
pub struct ApiInstrumentDirectory {
    client: Arc<MarketDataHttpClient>,
    universe: HashSet<Symbol>,
}

impl ApiInstrumentDirectory {
    /// Create a directory adapter.
    #[must_use]
    pub fn new(client: Arc<MarketDataHttpClient>, universe: &[String]) -> Self {
        Self {
            client,
            universe: universe.iter().map(Symbol::new).collect(),
        }
    }

    fn in_universe(&self, symbol: &Symbol) -> bool {
        self.universe.is_empty() || self.universe.contains(symbol)
    }
}

#[async_trait]
impl InstrumentDirectory for ApiInstrumentDirectory {
    async fn fetch_all(&self) -> Vec<Instrument> {
        let listings: Vec<StockListing> = match self.client.get("/stock/list").await {
            Ok(listings) => listings,
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch instrument directory");
                return Vec::new();
            }
        };

        listings
            .into_iter()
            .filter_map(StockListing::into_parts)
            .map(|(symbol, currency)| Instrument::new(symbol, currency))
            .filter(|instrument| self.in_universe(&instrument.symbol))
            .collect()
    }

    async fn lookup(&self, symbol: &Symbol) -> Option<Instrument> {
        let path = format!("/profile/{symbol}");
        let profiles: Vec<StockListing> = match self.client.get(&path).await {
            Ok(profiles) => profiles,
            Err(error) => {
                tracing::warn!(symbol = %symbol, error = %error, "failed to look up instrument");
                return None;
            }
        };

        profiles
            .into_iter()
            .filter_map(StockListing::into_parts)
            .map(|(symbol, currency)| Instrument::new(symbol, currency))
            .find(|instrument| &instrument.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedsConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn directory(server: &MockServer, universe: &[String]) -> ApiInstrumentDirectory {
        let config = FeedsConfig {
            base_url: server.uri(),
            api_key: "k".to_string(),
            ..FeedsConfig::default()
        };
        let client = Arc::new(MarketDataHttpClient::new(&config).unwrap());
        ApiInstrumentDirectory::new(client, universe)
    }

    #[tokio::test]
    async fn fetch_all_filters_incomplete_listings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"symbol": "TSLA", "currency": "USD"},
                {"symbol": "NOCCY"},
                {"currency": "USD"},
                {"symbol": "SAP", "currency": "EUR"}
            ])))
            .mount(&server)
            .await;

        let instruments = directory(&server, &[]).await.fetch_all().await;
        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[0].symbol.as_str(), "TSLA");
        assert_eq!(instruments[1].currency, "EUR");
    }

    #[tokio::test]
    async fn fetch_all_respects_configured_universe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"symbol": "TSLA", "currency": "USD"},
                {"symbol": "AAPL", "currency": "USD"},
                {"symbol": "SAP", "currency": "EUR"}
            ])))
            .mount(&server)
            .await;

        let universe = vec!["TSLA".to_string()];
        let instruments = directory(&server, &universe).await.fetch_all().await;
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments[0].symbol.as_str(), "TSLA");
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/list"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let instruments = directory(&server, &[]).await.fetch_all().await;
        assert!(instruments.is_empty());
    }

    #[tokio::test]
    async fn lookup_resolves_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/TSLA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"symbol": "TSLA", "currency": "USD"}
            ])))
            .mount(&server)
            .await;

        let found = directory(&server, &[]).await.lookup(&Symbol::new("TSLA")).await;
        assert_eq!(found, Some(Instrument::new("TSLA", "USD")));
    }

    #[tokio::test]
    async fn lookup_miss_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/NOPE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let found = directory(&server, &[]).await.lookup(&Symbol::new("NOPE")).await;
        assert_eq!(found, None);
    }
}
