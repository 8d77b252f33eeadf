//! Normalizer - pure mapping from raw source records to canonical drafts.
//!
//! Each function takes one raw record plus its instrument context and
//! produces zero or one [`EventDraft`]. Records with unparseable dates or
//! empty required labels are rejected with a [`DomainError`]; the batch
//! helpers log and drop them rather than letting one bad row poison a run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::json;

use crate::application::ports::{
    CorporateActionBundle, RawDividend, RawEarnings, RawMacroEvent, RawMerger, RawSplit,
};
use crate::domain::{
    DomainError, EventDraft, EventType, Impact, ImpactSignal, Instrument, OverlayPatch, classify,
};

/// Label used when an economic release arrives without a title.
const UNNAMED_EVENT: &str = "Unnamed Event";

/// Parse a source date field into an absolute timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, and the calendar
/// extract's `MM-DD-YYYY`. Date-only values land at midnight UTC.
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let invalid = || DomainError::InvalidDate {
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&dt));
    }
    for format in ["%Y-%m-%d", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    Err(invalid())
}

/// Normalize one macro-economic calendar row.
///
/// A source-supplied impact label bypasses the heuristic; otherwise the
/// numeric importance score is classified, with a missing score falling back
/// to [`Impact::Medium`].
pub fn normalize_macro(
    instrument: &Instrument,
    raw: &RawMacroEvent,
) -> Result<EventDraft, DomainError> {
    instrument.symbol.validate()?;
    let event_date = parse_event_date(&raw.date)?;

    let event_name = match raw.event.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNNAMED_EVENT.to_string(),
    };

    let impact = match raw.impact.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => Impact::from_label(label),
        _ => raw
            .importance
            .map_or(Impact::Medium, |score| classify(&ImpactSignal::Numeric(score))),
    };

    Ok(EventDraft {
        ticker: instrument.symbol.clone(),
        event_date,
        event_name: event_name.clone(),
        event_type: EventType::Economic,
        impact,
        details: json!({
            "currency": instrument.currency,
            "event": event_name,
        }),
        overlays: OverlayPatch::default(),
    })
}

/// Normalize one dividend record.
pub fn normalize_dividend(
    instrument: &Instrument,
    raw: &RawDividend,
) -> Result<EventDraft, DomainError> {
    instrument.symbol.validate()?;
    let event_date = parse_event_date(&raw.date)?;
    let amount = raw.dividend.ok_or_else(|| DomainError::MissingField {
        field: "dividend".to_string(),
    })?;

    Ok(EventDraft {
        ticker: instrument.symbol.clone(),
        event_date,
        event_name: format!("Dividend Payment: {amount}"),
        event_type: EventType::Dividend,
        impact: classify(&ImpactSignal::Numeric(amount)),
        details: serde_json::to_value(raw).unwrap_or_default(),
        overlays: OverlayPatch::default(),
    })
}

/// Normalize one earnings record.
///
/// Impact is the classified EPS surprise (`actual - estimated`). A missing
/// side makes the surprise NaN, which the classifier buckets as Low.
pub fn normalize_earnings(
    instrument: &Instrument,
    raw: &RawEarnings,
) -> Result<EventDraft, DomainError> {
    instrument.symbol.validate()?;
    let event_date = parse_event_date(&raw.date)?;

    let surprise = raw.eps.unwrap_or(f64::NAN) - raw.eps_estimated.unwrap_or(f64::NAN);

    Ok(EventDraft {
        ticker: instrument.symbol.clone(),
        event_date,
        event_name: "Earnings Report".to_string(),
        event_type: EventType::Earnings,
        impact: classify(&ImpactSignal::Numeric(surprise)),
        details: json!({
            "eps": raw.eps,
            "epsEstimated": raw.eps_estimated,
            "revenue": raw.revenue,
            "revenueEstimated": raw.revenue_estimated,
        }),
        overlays: OverlayPatch::default(),
    })
}

/// Normalize one stock-split record.
pub fn normalize_split(
    instrument: &Instrument,
    raw: &RawSplit,
) -> Result<EventDraft, DomainError> {
    instrument.symbol.validate()?;
    let event_date = parse_event_date(&raw.date)?;
    let numerator = raw.numerator.ok_or_else(|| DomainError::MissingField {
        field: "numerator".to_string(),
    })?;
    let denominator = raw.denominator.ok_or_else(|| DomainError::MissingField {
        field: "denominator".to_string(),
    })?;

    Ok(EventDraft {
        ticker: instrument.symbol.clone(),
        event_date,
        event_name: format!("Stock Split {numerator}:{denominator}"),
        event_type: EventType::Split,
        // A zero denominator yields +inf here, which buckets as High.
        impact: classify(&ImpactSignal::Numeric(numerator / denominator)),
        details: serde_json::to_value(raw).unwrap_or_default(),
        overlays: OverlayPatch::default(),
    })
}

/// Normalize one merger record. Always High impact; a deal without a title is
/// dropped rather than persisted with a placeholder name.
pub fn normalize_merger(
    instrument: &Instrument,
    raw: &RawMerger,
) -> Result<EventDraft, DomainError> {
    instrument.symbol.validate()?;
    let event_date = parse_event_date(&raw.date)?;
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DomainError::MissingField {
            field: "title".to_string(),
        })?;

    Ok(EventDraft {
        ticker: instrument.symbol.clone(),
        event_date,
        event_name: title.to_string(),
        event_type: EventType::Ma,
        impact: Impact::High,
        details: serde_json::to_value(raw).unwrap_or_default(),
        overlays: OverlayPatch::default(),
    })
}

/// Normalize the macro rows matching an instrument's currency, dropping and
/// logging invalid rows.
#[must_use]
pub fn normalize_macro_events(
    instrument: &Instrument,
    raws: &[RawMacroEvent],
) -> Vec<EventDraft> {
    raws.iter()
        .filter(|raw| raw.matches_currency(&instrument.currency))
        .filter_map(|raw| keep_or_drop(instrument, "macro", normalize_macro(instrument, raw)))
        .collect()
}

/// Normalize one instrument's corporate-action bundle, dropping and logging
/// invalid records.
#[must_use]
pub fn normalize_corporate_actions(
    instrument: &Instrument,
    bundle: &CorporateActionBundle,
) -> Vec<EventDraft> {
    let mut drafts = Vec::with_capacity(bundle.len());

    drafts.extend(bundle.dividends.iter().filter_map(|raw| {
        keep_or_drop(instrument, "dividend", normalize_dividend(instrument, raw))
    }));
    drafts.extend(bundle.earnings.iter().filter_map(|raw| {
        keep_or_drop(instrument, "earnings", normalize_earnings(instrument, raw))
    }));
    drafts.extend(
        bundle
            .splits
            .iter()
            .filter_map(|raw| keep_or_drop(instrument, "split", normalize_split(instrument, raw))),
    );
    drafts.extend(
        bundle
            .mergers
            .iter()
            .filter_map(|raw| keep_or_drop(instrument, "merger", normalize_merger(instrument, raw))),
    );

    drafts
}

fn keep_or_drop(
    instrument: &Instrument,
    feed: &str,
    result: Result<EventDraft, DomainError>,
) -> Option<EventDraft> {
    match result {
        Ok(draft) => Some(draft),
        Err(reason) => {
            tracing::warn!(
                symbol = %instrument.symbol,
                feed = feed,
                reason = %reason,
                "dropping record that failed normalization"
            );
            None
        }
    }
}
