//! Ingest Events Use Case
//!
//! One reconciliation run: fetch → normalize → merge, for the full
//! instrument universe or a single ticker on demand. Upstream failures have
//! already been degraded to empty results by the adapters, so a run never
//! fails; it reports what it managed to do.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::application::ports::{
    CorporateActionBundle, CorporateActionsSource, EventStore, InstrumentDirectory, MacroCalendar,
    MacroFetch,
};
use crate::application::services::normalizer;
use crate::application::services::{ReconcileSummary, Reconciler};
use crate::domain::{Instrument, Symbol};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Instruments in scope for the run.
    pub instruments: usize,
    /// Macro rows fetched (after source-side malformed-row filtering).
    pub macro_events: usize,
    /// Macro rows the source skipped as malformed.
    pub malformed_macro_rows: usize,
    /// Normalized candidates handed to the reconciler.
    pub candidates: usize,
    /// Merge tallies.
    pub summary: ReconcileSummary,
}

/// Use case for running one fetch-normalize-merge cycle.
pub struct IngestEventsUseCase<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    directory: Arc<D>,
    macro_primary: Arc<P>,
    macro_fallback: Option<Arc<F>>,
    corporate_actions: Arc<C>,
    reconciler: Reconciler<S>,
    max_concurrent_instruments: usize,
}

impl<D, P, F, C, S> IngestEventsUseCase<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    /// Wire up an ingestion use case.
    ///
    /// `macro_fallback` is consulted when the primary macro source yields no
    /// events (the live API being down degrades to exactly that).
    pub fn new(
        directory: Arc<D>,
        macro_primary: Arc<P>,
        macro_fallback: Option<Arc<F>>,
        corporate_actions: Arc<C>,
        store: Arc<S>,
        max_concurrent_instruments: usize,
    ) -> Self {
        Self {
            directory,
            macro_primary,
            macro_fallback,
            corporate_actions,
            reconciler: Reconciler::new(store),
            max_concurrent_instruments: max_concurrent_instruments.max(1),
        }
    }

    /// Run a full-universe ingestion cycle.
    ///
    /// An empty instrument directory short-circuits the run with a warning;
    /// it is an expected upstream hiccup, not an error.
    pub async fn run_full(&self) -> IngestReport {
        let instruments = self.directory.fetch_all().await;
        if instruments.is_empty() {
            tracing::warn!("no instruments fetched, skipping ingestion run");
            return IngestReport::default();
        }

        self.run_scoped(&instruments).await
    }

    /// Run an on-demand cycle scoped to a single ticker.
    pub async fn run_ticker(&self, symbol: &Symbol) -> IngestReport {
        match self.directory.lookup(symbol).await {
            Some(instrument) => self.run_scoped(std::slice::from_ref(&instrument)).await,
            None => {
                tracing::warn!(
                    symbol = %symbol,
                    "symbol not resolvable in instrument directory, skipping on-demand run"
                );
                IngestReport::default()
            }
        }
    }

    async fn run_scoped(&self, instruments: &[Instrument]) -> IngestReport {
        let (macro_fetch, bundles) = tokio::join!(
            self.fetch_macro_events(),
            self.fetch_corporate_actions(instruments)
        );

        if macro_fetch.events.is_empty() {
            tracing::warn!("no macro events parsed from any source");
        }
        if macro_fetch.malformed_rows > 0 {
            tracing::warn!(
                count = macro_fetch.malformed_rows,
                "macro calendar rows skipped as malformed"
            );
        }

        let mut candidates = Vec::new();
        for (instrument, bundle) in instruments.iter().zip(&bundles) {
            candidates.extend(normalizer::normalize_macro_events(
                instrument,
                &macro_fetch.events,
            ));
            candidates.extend(normalizer::normalize_corporate_actions(instrument, bundle));
        }

        let summary = self.reconciler.merge_batch(&candidates).await;

        tracing::info!(
            instruments = instruments.len(),
            macro_events = macro_fetch.events.len(),
            candidates = candidates.len(),
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "ingestion run complete"
        );

        IngestReport {
            instruments: instruments.len(),
            macro_events: macro_fetch.events.len(),
            malformed_macro_rows: macro_fetch.malformed_rows,
            candidates: candidates.len(),
            summary,
        }
    }

    /// Fetch macro events from the primary source, falling back to the local
    /// extract when the primary comes back empty.
    async fn fetch_macro_events(&self) -> MacroFetch {
        let fetch = self.macro_primary.fetch().await;
        if fetch.events.is_empty() {
            if let Some(fallback) = &self.macro_fallback {
                tracing::warn!("primary macro calendar yielded no events, using local extract");
                return fallback.fetch().await;
            }
        }
        fetch
    }

    /// Fan out the per-instrument corporate-action fetches, bounded by the
    /// configured concurrency cap. Results come back in instrument order.
    async fn fetch_corporate_actions(
        &self,
        instruments: &[Instrument],
    ) -> Vec<CorporateActionBundle> {
        let gate = Arc::new(Semaphore::new(self.max_concurrent_instruments));

        let fetches = instruments.iter().map(|instrument| {
            let gate = Arc::clone(&gate);
            async move {
                let _permit = match gate.acquire().await {
                    Ok(permit) => permit,
                    // Closed semaphore cannot happen while we hold the Arc.
                    Err(_) => return CorporateActionBundle::default(),
                };
                self.corporate_actions.fetch(instrument).await
            }
        });

        futures::future::join_all(fetches).await
    }
}
