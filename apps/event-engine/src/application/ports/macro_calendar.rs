//! Macro Calendar Port (Driven Port)
//!
//! One capability, two interchangeable strategies: the live market-data API
//! and a locally cached economic-calendar extract. Adapters never propagate
//! transport or parse failures; a failed fetch degrades to an empty result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A macro-economic calendar row as shaped by its source.
///
/// Dates stay in source form here; the normalizer owns date parsing and drops
/// rows it cannot parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMacroEvent {
    /// Source date field, unparsed.
    pub date: String,
    /// Event title, if the source provided one.
    #[serde(default)]
    pub event: Option<String>,
    /// Currency the release concerns (e.g. "USD").
    #[serde(default)]
    pub currency: Option<String>,
    /// Source-provided impact label; bypasses the heuristic when present.
    #[serde(default)]
    pub impact: Option<String>,
    /// Numeric importance score for the heuristic.
    #[serde(default)]
    pub importance: Option<f64>,
}

impl RawMacroEvent {
    /// Whether this row's currency matches the given instrument currency.
    #[must_use]
    pub fn matches_currency(&self, currency: &str) -> bool {
        self.currency.as_deref() == Some(currency)
    }
}

/// Result of one macro-calendar fetch.
#[derive(Debug, Clone, Default)]
pub struct MacroFetch {
    /// Rows whose dates were readable by the source adapter.
    pub events: Vec<RawMacroEvent>,
    /// Rows rejected by the source because their date did not match the
    /// source's expected format. Reported for diagnostics, never fatal.
    pub malformed_rows: usize,
}

/// Port for a macro-economic calendar source.
#[async_trait]
pub trait MacroCalendar: Send + Sync {
    /// Fetch the calendar. Failures degrade to an empty fetch.
    async fn fetch(&self) -> MacroFetch;
}
