//! Event Store Port (Driven Port)
//!
//! Durable keyed storage for canonical events. The upsert operation is the
//! enforcement point for the `(ticker, event_date)` uniqueness invariant and
//! must be atomic with respect to concurrent callers targeting the same key.

use async_trait::async_trait;

use crate::domain::{Event, EventDraft, NaturalKey, OverlayPatch, Symbol};

/// Event store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No event exists with the given surrogate id.
    #[error("event not found: {id}")]
    NotFound {
        /// The missing id.
        id: i64,
    },

    /// Underlying storage failure.
    #[error("storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },

    /// A stored row could not be decoded into an event.
    #[error("serialization error: {message}")]
    Serialization {
        /// Error details.
        message: String,
    },
}

/// Port for the durable event store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up an event by its natural key.
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Event>, StoreError>;

    /// Insert a new event, assigning a surrogate id.
    ///
    /// Fails on a natural-key collision; use [`EventStore::upsert_by_natural_key`]
    /// when the key may already exist.
    async fn insert(&self, draft: &EventDraft) -> Result<Event, StoreError>;

    /// Atomically insert or refresh the event stored under the draft's
    /// natural key.
    ///
    /// On update the name, type, impact, and details are replaced; overlay
    /// fields are overwritten only where the draft explicitly supplies a
    /// value, so repeated ingestion never erases analyst-entered overlays.
    async fn upsert_by_natural_key(&self, draft: &EventDraft) -> Result<Event, StoreError>;

    /// Apply a partial update to the event with the given id.
    ///
    /// Returns [`StoreError::NotFound`] when the id does not resolve.
    async fn update_by_id(&self, id: i64, patch: &OverlayPatch) -> Result<Event, StoreError>;

    /// List stored events, optionally filtered to one ticker.
    async fn list(&self, ticker: Option<&Symbol>) -> Result<Vec<Event>, StoreError>;
}
