//! Reconciler - merges normalized candidates into the event store.
//!
//! Each candidate is merged independently under its natural key; a storage
//! failure for one candidate is logged and counted, never aborts the batch.
//! The store's atomic upsert is what keeps concurrent runs from producing
//! duplicate rows for a key; the lookup here only decides what to report and
//! whether a write can be skipped entirely.

use std::sync::Arc;

use crate::application::ports::{EventStore, StoreError};
use crate::domain::EventDraft;

/// How one candidate was merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No event existed for the natural key; a new row was inserted.
    Created,
    /// An existing row was refreshed in place.
    Updated,
    /// The stored row already matched the candidate; nothing was written.
    Unchanged,
}

/// Tallies for one batch merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Candidates that created a new row.
    pub created: usize,
    /// Candidates that refreshed an existing row.
    pub updated: usize,
    /// Candidates that required no write.
    pub unchanged: usize,
    /// Candidates whose merge failed; logged per candidate.
    pub failed: usize,
}

impl ReconcileSummary {
    /// Total candidates processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.failed
    }

    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Created => self.created += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// Merges candidate events into the store under the uniqueness invariant.
pub struct Reconciler<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> Reconciler<S> {
    /// Create a reconciler over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Merge a batch of candidates, isolating per-candidate failures.
    pub async fn merge_batch(&self, candidates: &[EventDraft]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for candidate in candidates {
            match self.merge_one(candidate).await {
                Ok(outcome) => summary.record(outcome),
                Err(error) => {
                    summary.failed += 1;
                    tracing::warn!(
                        key = %candidate.natural_key(),
                        error = %error,
                        "failed to merge candidate, continuing with batch"
                    );
                }
            }
        }

        tracing::debug!(
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "batch merge complete"
        );
        summary
    }

    /// Merge one candidate under its natural key.
    pub async fn merge_one(&self, candidate: &EventDraft) -> Result<MergeOutcome, StoreError> {
        let key = candidate.natural_key();

        match self.store.find_by_natural_key(&key).await? {
            Some(existing) if !candidate.would_change(&existing) => Ok(MergeOutcome::Unchanged),
            Some(_) => {
                self.store.upsert_by_natural_key(candidate).await?;
                Ok(MergeOutcome::Updated)
            }
            None => {
                // A racing run may have inserted the key since the lookup;
                // the upsert resolves that to an update on the same row.
                self.store.upsert_by_natural_key(candidate).await?;
                Ok(MergeOutcome::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, EventType, Impact, NaturalKey, OverlayPatch, Symbol};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store stub that fails every upsert for a chosen ticker.
    struct FlakyStore {
        events: RwLock<HashMap<NaturalKey, Event>>,
        failing_ticker: Option<String>,
        writes: AtomicUsize,
    }

    impl FlakyStore {
        fn new(failing_ticker: Option<&str>) -> Self {
            Self {
                events: RwLock::new(HashMap::new()),
                failing_ticker: failing_ticker.map(str::to_string),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EventStore for FlakyStore {
        async fn find_by_natural_key(
            &self,
            key: &NaturalKey,
        ) -> Result<Option<Event>, StoreError> {
            Ok(self.events.read().unwrap().get(key).cloned())
        }

        async fn insert(&self, draft: &EventDraft) -> Result<Event, StoreError> {
            self.upsert_by_natural_key(draft).await
        }

        async fn upsert_by_natural_key(&self, draft: &EventDraft) -> Result<Event, StoreError> {
            if self.failing_ticker.as_deref() == Some(draft.ticker.as_str()) {
                return Err(StoreError::Storage {
                    message: "disk full".to_string(),
                });
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut events = self.events.write().unwrap();
            let key = draft.natural_key();
            let id = Some(events.len() as i64 + 1);
            let event = Event {
                id,
                ticker: draft.ticker.clone(),
                event_date: draft.event_date,
                event_name: draft.event_name.clone(),
                event_type: draft.event_type,
                impact: draft.impact,
                details: draft.details.clone(),
                clean_implied_vol: None,
                dirty_volume: None,
                total_implied_vol: None,
                vol: None,
            };
            events.insert(key, event.clone());
            Ok(event)
        }

        async fn update_by_id(&self, id: i64, _patch: &OverlayPatch) -> Result<Event, StoreError> {
            Err(StoreError::NotFound { id })
        }

        async fn list(&self, _ticker: Option<&Symbol>) -> Result<Vec<Event>, StoreError> {
            Ok(self.events.read().unwrap().values().cloned().collect())
        }
    }

    fn draft(ticker: &str, name: &str) -> EventDraft {
        EventDraft {
            ticker: Symbol::new(ticker),
            event_date: Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap(),
            event_name: name.to_string(),
            event_type: EventType::Economic,
            impact: Impact::High,
            details: serde_json::json!({"currency": "USD", "event": name}),
            overlays: OverlayPatch::default(),
        }
    }

    #[tokio::test]
    async fn first_merge_creates_second_is_noop() {
        let store = Arc::new(FlakyStore::new(None));
        let reconciler = Reconciler::new(Arc::clone(&store));

        let outcome = reconciler.merge_one(&draft("TSLA", "CPI Release")).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Created);

        let outcome = reconciler.merge_one(&draft("TSLA", "CPI Release")).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);

        // One row, one physical write.
        assert_eq!(store.list(None).await.unwrap().len(), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshed_candidate_updates_in_place() {
        let store = Arc::new(FlakyStore::new(None));
        let reconciler = Reconciler::new(Arc::clone(&store));

        reconciler.merge_one(&draft("TSLA", "CPI Release")).await.unwrap();
        let outcome = reconciler
            .merge_one(&draft("TSLA", "CPI Release (Revised)"))
            .await
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Updated);

        let events = store.list(None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "CPI Release (Revised)");
    }

    #[tokio::test]
    async fn one_failing_candidate_does_not_abort_batch() {
        let store = Arc::new(FlakyStore::new(Some("BAD")));
        let reconciler = Reconciler::new(Arc::clone(&store));

        let batch = vec![
            draft("TSLA", "CPI Release"),
            draft("BAD", "Doomed"),
            draft("AAPL", "CPI Release"),
        ];
        let summary = reconciler.merge_batch(&batch).await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }
}
