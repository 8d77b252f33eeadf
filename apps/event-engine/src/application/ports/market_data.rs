//! Market Data Ports (Driven Ports)
//!
//! The instrument directory and the corporate-actions feeds. Raw records
//! carry each feed's own shape; the normalizer maps them into the canonical
//! event schema. Adapters isolate upstream failures: a failed call returns an
//! empty result and logs, it never propagates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Instrument, Symbol};

/// A dividend record as delivered by the corporate-actions feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDividend {
    /// Payment date, unparsed.
    pub date: String,
    /// Dividend amount per share.
    #[serde(default)]
    pub dividend: Option<f64>,
    /// Record date, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_date: Option<String>,
    /// Declaration date, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_date: Option<String>,
}

/// An earnings-calendar record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEarnings {
    /// Report date, unparsed.
    pub date: String,
    /// Actual earnings per share, once reported.
    #[serde(default)]
    pub eps: Option<f64>,
    /// Consensus EPS estimate.
    #[serde(default)]
    pub eps_estimated: Option<f64>,
    /// Reported revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Consensus revenue estimate.
    #[serde(default)]
    pub revenue_estimated: Option<f64>,
}

/// A stock-split record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSplit {
    /// Effective date, unparsed.
    pub date: String,
    /// Split numerator (new shares).
    #[serde(default)]
    pub numerator: Option<f64>,
    /// Split denominator (old shares).
    #[serde(default)]
    pub denominator: Option<f64>,
}

/// A merger/acquisition record from the global deal feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMerger {
    /// Announcement date, unparsed.
    pub date: String,
    /// Symbol the deal concerns; the feed is global, adapters filter on it.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Deal title.
    #[serde(default)]
    pub title: Option<String>,
}

/// The four corporate-action feeds for one instrument, joined.
#[derive(Debug, Clone, Default)]
pub struct CorporateActionBundle {
    /// Dividend records.
    pub dividends: Vec<RawDividend>,
    /// Earnings records.
    pub earnings: Vec<RawEarnings>,
    /// Split records.
    pub splits: Vec<RawSplit>,
    /// Merger records already filtered to the instrument's symbol.
    pub mergers: Vec<RawMerger>,
}

impl CorporateActionBundle {
    /// Total raw records across the four feeds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dividends.len() + self.earnings.len() + self.splits.len() + self.mergers.len()
    }

    /// Whether all four feeds came back empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Port for the instrument directory (symbol to currency lookup).
#[async_trait]
pub trait InstrumentDirectory: Send + Sync {
    /// Fetch the instrument universe.
    ///
    /// Entries lacking a symbol or currency are filtered out. An empty
    /// result means "try later", not "no instruments exist".
    async fn fetch_all(&self) -> Vec<Instrument>;

    /// Resolve a single symbol to an instrument, if the directory knows it.
    async fn lookup(&self, symbol: &Symbol) -> Option<Instrument>;
}

/// Port for the corporate-actions feeds.
#[async_trait]
pub trait CorporateActionsSource: Send + Sync {
    /// Fetch dividends, earnings, splits, and mergers for one instrument.
    ///
    /// The four sub-fetches are independent: each degrades to an empty list
    /// on failure without affecting its siblings.
    async fn fetch(&self, instrument: &Instrument) -> CorporateActionBundle;
}
