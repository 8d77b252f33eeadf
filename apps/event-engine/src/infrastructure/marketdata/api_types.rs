//! Wire types for the live market-data API.
//!
//! Upstream payloads are loosely shaped; every field an endpoint might omit
//! is optional here, and filtering happens in the adapters.

use serde::Deserialize;

/// One entry from the stock listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockListing {
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Quote currency.
    #[serde(default)]
    pub currency: Option<String>,
}

impl StockListing {
    /// Symbol and currency, when both are present and non-empty.
    #[must_use]
    pub fn into_parts(self) -> Option<(String, String)> {
        let symbol = self.symbol.filter(|s| !s.trim().is_empty())?;
        let currency = self.currency.filter(|c| !c.trim().is_empty())?;
        Some((symbol, currency))
    }
}

/// One row from the economic calendar endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMacroRow {
    /// Release timestamp.
    #[serde(default)]
    pub date: Option<String>,
    /// Release title.
    #[serde(default)]
    pub event: Option<String>,
    /// Currency the release concerns.
    #[serde(default)]
    pub currency: Option<String>,
    /// Source-provided impact label.
    #[serde(default)]
    pub impact: Option<String>,
    /// Numeric importance score.
    #[serde(default)]
    pub importance: Option<f64>,
}
