//! In-memory event store for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{EventStore, StoreError};
use crate::domain::{Event, EventDraft, NaturalKey, OverlayPatch, Symbol};

/// In-memory implementation of [`EventStore`].
///
/// Suitable for testing and development. Not for production use. All writes
/// serialize through the interior lock, which is what makes the upsert atomic
/// with respect to concurrent callers on the same key.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<NaturalKey, Event>,
    next_id: i64,
}

impl Inner {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl InMemoryEventStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().events.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().events.is_empty()
    }

    /// Remove all events.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.events.clear();
    }
}

fn materialize(draft: &EventDraft, id: i64) -> Event {
    let mut event = Event {
        id: Some(id),
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
    draft.overlays.apply_to(&mut event);
    event
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Event>, StoreError> {
        Ok(self.inner.read().unwrap().events.get(key).cloned())
    }

    async fn insert(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let key = draft.natural_key();
        if inner.events.contains_key(&key) {
            return Err(StoreError::Storage {
                message: format!("natural key already exists: {key}"),
            });
        }
        let id = inner.assign_id();
        let event = materialize(draft, id);
        inner.events.insert(key, event.clone());
        Ok(event)
    }

    async fn upsert_by_natural_key(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let key = draft.natural_key();

        if let Some(existing) = inner.events.get_mut(&key) {
            existing.event_name = draft.event_name.clone();
            existing.event_type = draft.event_type;
            existing.impact = draft.impact;
            existing.details = draft.details.clone();
            draft.overlays.apply_to(existing);
            return Ok(existing.clone());
        }

        let id = inner.assign_id();
        let event = materialize(draft, id);
        inner.events.insert(key, event.clone());
        Ok(event)
    }

    async fn update_by_id(&self, id: i64, patch: &OverlayPatch) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let event = inner
            .events
            .values_mut()
            .find(|event| event.id == Some(id))
            .ok_or(StoreError::NotFound { id })?;

        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn list(&self, ticker: Option<&Symbol>) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| ticker.is_none_or(|t| &event.ticker == t))
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.event_date
                .cmp(&b.event_date)
                .then_with(|| a.ticker.as_str().cmp(b.ticker.as_str()))
        });
        Ok(events)
    }
}
