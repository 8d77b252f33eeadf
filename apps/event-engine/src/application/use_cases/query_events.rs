//! Query Events Use Case
//!
//! Read path for the dashboard. A filtered query that finds nothing triggers
//! one on-demand ingestion scoped to that ticker before re-querying, so a
//! never-before-seen symbol gets lazily populated instead of returning an
//! empty list forever.

use std::sync::Arc;

use crate::application::ports::{
    CorporateActionsSource, EventStore, InstrumentDirectory, MacroCalendar, StoreError,
};
use crate::application::use_cases::IngestEventsUseCase;
use crate::domain::{Event, Symbol};

/// Use case answering read queries over stored events.
pub struct QueryEventsUseCase<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    store: Arc<S>,
    ingest: Arc<IngestEventsUseCase<D, P, F, C, S>>,
}

impl<D, P, F, C, S> QueryEventsUseCase<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    /// Create a query use case over the store and the ingestion path.
    pub const fn new(store: Arc<S>, ingest: Arc<IngestEventsUseCase<D, P, F, C, S>>) -> Self {
        Self { store, ingest }
    }

    /// List stored events, optionally filtered to one ticker.
    ///
    /// Always returns a (possibly empty) list; "no data" is not an error.
    pub async fn list_events(&self, ticker: Option<&Symbol>) -> Result<Vec<Event>, StoreError> {
        let Some(symbol) = ticker else {
            return self.store.list(None).await;
        };

        let events = self.store.list(Some(symbol)).await?;
        if !events.is_empty() {
            return Ok(events);
        }

        tracing::info!(
            symbol = %symbol,
            "no stored events for ticker, running on-demand ingestion"
        );
        self.ingest.run_ticker(symbol).await;
        self.store.list(Some(symbol)).await
    }
}
