//! Canonical event entity and its value objects.
//!
//! An [`Event`] is the persisted record of one market-moving occurrence for
//! one instrument. The pair `(ticker, event_date)` is the natural key: at
//! most one event may exist for a given pair at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::instrument::Symbol;

/// Category of a market event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Macro-economic release (CPI, rate decision, ...).
    Economic,
    /// Dividend payment.
    Dividend,
    /// Earnings report.
    Earnings,
    /// Stock split.
    Split,
    /// Merger or acquisition.
    #[serde(rename = "M&A")]
    Ma,
}

impl EventType {
    /// Wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "Economic",
            Self::Dividend => "Dividend",
            Self::Earnings => "Earnings",
            Self::Split => "Split",
            Self::Ma => "M&A",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Economic" => Some(Self::Economic),
            "Dividend" => Some(Self::Dividend),
            "Earnings" => Some(Self::Earnings),
            "Split" => Some(Self::Split),
            "M&A" => Some(Self::Ma),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse market-impact classification.
///
/// This is a heuristic bucket, not a predictive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    /// Likely market-moving.
    High,
    /// Moderate.
    Medium,
    /// Minor.
    Low,
    /// No usable signal from the source.
    Unknown,
}

impl Impact {
    /// Wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a source-supplied impact label.
    ///
    /// Labels outside the known set map to [`Impact::Unknown`]. This is the
    /// path for sources that already classify their events; heuristic
    /// classification of raw signals lives in [`super::classify`].
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        match s {
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key for an event: instrument symbol plus absolute timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    /// Instrument symbol.
    pub ticker: Symbol,
    /// Absolute event timestamp.
    pub event_date: DateTime<Utc>,
}

impl NaturalKey {
    /// Create a natural key.
    #[must_use]
    pub const fn new(ticker: Symbol, event_date: DateTime<Utc>) -> Self {
        Self { ticker, event_date }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ticker, self.event_date.to_rfc3339())
    }
}

/// Analyst-entered overlay fields.
///
/// Never sourced from an upstream feed; attached to an event after ingestion
/// through the manual-edit path. A `None` field means "leave the stored value
/// alone", which is what makes repeated ingestion unable to erase overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPatch {
    /// Total implied volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_implied_vol: Option<f64>,
    /// Clean implied volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_implied_vol: Option<f64>,
    /// Dirty volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirty_volume: Option<f64>,
    /// Realized volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol: Option<f64>,
}

impl OverlayPatch {
    /// Whether the patch carries no values at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_implied_vol.is_none()
            && self.clean_implied_vol.is_none()
            && self.dirty_volume.is_none()
            && self.vol.is_none()
    }

    /// Merge this patch into an event, overwriting only supplied fields.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(v) = self.total_implied_vol {
            event.total_implied_vol = Some(v);
        }
        if let Some(v) = self.clean_implied_vol {
            event.clean_implied_vol = Some(v);
        }
        if let Some(v) = self.dirty_volume {
            event.dirty_volume = Some(v);
        }
        if let Some(v) = self.vol {
            event.vol = Some(v);
        }
    }
}

/// The persisted event entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Storage-assigned surrogate key; present only after persistence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Instrument symbol; never empty.
    pub ticker: Symbol,
    /// Absolute event timestamp; always valid and parseable.
    pub event_date: DateTime<Utc>,
    /// Human-readable label; never empty.
    pub event_name: String,
    /// Event category.
    pub event_type: EventType,
    /// Coarse impact classification.
    pub impact: Impact,
    /// Source-specific payload, opaque to downstream consumers.
    pub details: serde_json::Value,
    /// Analyst overlay: clean implied volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_implied_vol: Option<f64>,
    /// Analyst overlay: dirty volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirty_volume: Option<f64>,
    /// Analyst overlay: total implied volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_implied_vol: Option<f64>,
    /// Analyst overlay: realized volatility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vol: Option<f64>,
}

impl Event {
    /// The natural key for this event.
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.ticker.clone(), self.event_date)
    }
}

/// A normalized candidate produced by the normalizer, not yet persisted.
///
/// Drafts carry no surrogate id; their overlays are empty unless the source
/// explicitly supplied replacement values.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// Instrument symbol; never empty.
    pub ticker: Symbol,
    /// Absolute event timestamp.
    pub event_date: DateTime<Utc>,
    /// Human-readable label; never empty.
    pub event_name: String,
    /// Event category.
    pub event_type: EventType,
    /// Coarse impact classification.
    pub impact: Impact,
    /// Source-specific payload.
    pub details: serde_json::Value,
    /// Overlay values explicitly carried by the source, if any.
    pub overlays: OverlayPatch,
}

impl EventDraft {
    /// The natural key for this draft.
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.ticker.clone(), self.event_date)
    }

    /// Whether persisting this draft over `existing` would change anything.
    #[must_use]
    pub fn would_change(&self, existing: &Event) -> bool {
        if existing.event_name != self.event_name
            || existing.event_type != self.event_type
            || existing.impact != self.impact
            || existing.details != self.details
        {
            return true;
        }

        let o = &self.overlays;
        o.total_implied_vol
            .is_some_and(|v| existing.total_implied_vol != Some(v))
            || o.clean_implied_vol
                .is_some_and(|v| existing.clean_implied_vol != Some(v))
            || o.dirty_volume.is_some_and(|v| existing.dirty_volume != Some(v))
            || o.vol.is_some_and(|v| existing.vol != Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(name: &str) -> EventDraft {
        EventDraft {
            ticker: Symbol::new("TSLA"),
            event_date: Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap(),
            event_name: name.to_string(),
            event_type: EventType::Economic,
            impact: Impact::High,
            details: serde_json::json!({"currency": "USD"}),
            overlays: OverlayPatch::default(),
        }
    }

    fn stored(name: &str) -> Event {
        let d = draft(name);
        Event {
            id: Some(1),
            ticker: d.ticker,
            event_date: d.event_date,
            event_name: d.event_name,
            event_type: d.event_type,
            impact: d.impact,
            details: d.details,
            clean_implied_vol: None,
            dirty_volume: None,
            total_implied_vol: None,
            vol: Some(12.5),
        }
    }

    #[test]
    fn event_type_round_trips_through_storage_repr() {
        for ty in [
            EventType::Economic,
            EventType::Dividend,
            EventType::Earnings,
            EventType::Split,
            EventType::Ma,
        ] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("Rumor"), None);
    }

    #[test]
    fn event_type_ma_serializes_with_ampersand() {
        let json = serde_json::to_string(&EventType::Ma).unwrap();
        assert_eq!(json, "\"M&A\"");
    }

    #[test]
    fn impact_label_parsing_is_closed() {
        assert_eq!(Impact::from_label("High"), Impact::High);
        assert_eq!(Impact::from_label("Low"), Impact::Low);
        assert_eq!(Impact::from_label("Holiday"), Impact::Unknown);
    }

    #[test]
    fn overlay_patch_applies_only_supplied_fields() {
        let mut event = stored("CPI Release");
        let patch = OverlayPatch {
            clean_implied_vol: Some(4.2),
            ..OverlayPatch::default()
        };
        patch.apply_to(&mut event);

        assert_eq!(event.clean_implied_vol, Some(4.2));
        // vol untouched by a patch that does not carry it
        assert_eq!(event.vol, Some(12.5));
    }

    #[test]
    fn would_change_detects_refreshed_fields() {
        let existing = stored("CPI Release");
        assert!(!draft("CPI Release").would_change(&existing));
        assert!(draft("CPI Release (Final)").would_change(&existing));
    }

    #[test]
    fn would_change_ignores_absent_overlays() {
        let existing = stored("CPI Release");
        let mut candidate = draft("CPI Release");
        // Candidate without vol must not count the stored vol as a change.
        assert!(!candidate.would_change(&existing));

        candidate.overlays.vol = Some(9.0);
        assert!(candidate.would_change(&existing));

        candidate.overlays.vol = Some(12.5);
        assert!(!candidate.would_change(&existing));
    }

    #[test]
    fn event_serializes_camel_case() {
        let event = stored("CPI Release");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("eventName").is_some());
        assert!(json.get("eventDate").is_some());
        assert!(json.get("vol").is_some());
        // absent overlays are omitted entirely
        assert!(json.get("cleanImpliedVol").is_none());
    }
}
