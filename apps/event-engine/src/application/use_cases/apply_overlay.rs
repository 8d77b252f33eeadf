//! Apply Overlay Use Case
//!
//! The manual-edit path: analysts attach volatility overlays to an existing
//! event. Only the four overlay fields are writable here; an empty patch and
//! an unknown id are distinct, user-visible error kinds.

use std::sync::Arc;

use crate::application::ports::{EventStore, StoreError};
use crate::domain::{Event, OverlayPatch};

/// Overlay edit error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OverlayError {
    /// The request carried none of the editable fields.
    #[error("no valid fields to update")]
    NoValidFields,

    /// No event exists with the given id.
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
}

/// Use case applying analyst overlays to a stored event.
pub struct ApplyOverlayUseCase<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> ApplyOverlayUseCase<S> {
    /// Create an overlay use case over the given store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply the patch to the event with the given id.
    pub async fn execute(&self, id: i64, patch: OverlayPatch) -> Result<Event, OverlayError> {
        if patch.is_empty() {
            return Err(OverlayError::NoValidFields);
        }

        match self.store.update_by_id(id, &patch).await {
            Ok(event) => {
                tracing::info!(id = id, "overlay applied");
                Ok(event)
            }
            Err(StoreError::NotFound { id }) => Err(OverlayError::NotFound { id }),
            Err(other) => Err(OverlayError::Storage {
                message: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventDraft, EventType, Impact, Symbol};
    use crate::infrastructure::persistence::InMemoryEventStore;
    use chrono::{TimeZone, Utc};

    fn draft() -> EventDraft {
        EventDraft {
            ticker: Symbol::new("TSLA"),
            event_date: Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap(),
            event_name: "CPI Release".to_string(),
            event_type: EventType::Economic,
            impact: Impact::High,
            details: serde_json::json!({}),
            overlays: OverlayPatch::default(),
        }
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let store = Arc::new(InMemoryEventStore::new());
        let uc = ApplyOverlayUseCase::new(store);

        let result = uc.execute(1, OverlayPatch::default()).await;
        assert!(matches!(result, Err(OverlayError::NoValidFields)));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = Arc::new(InMemoryEventStore::new());
        let uc = ApplyOverlayUseCase::new(store);

        let patch = OverlayPatch {
            vol: Some(9.0),
            ..OverlayPatch::default()
        };
        let result = uc.execute(42, patch).await;
        assert!(matches!(result, Err(OverlayError::NotFound { id: 42 })));
    }

    #[tokio::test]
    async fn patch_updates_only_supplied_fields() {
        let store = Arc::new(InMemoryEventStore::new());
        let stored = store.insert(&draft()).await.unwrap();
        let id = stored.id.unwrap();

        let uc = ApplyOverlayUseCase::new(Arc::clone(&store));
        let patch = OverlayPatch {
            vol: Some(12.5),
            total_implied_vol: Some(30.0),
            ..OverlayPatch::default()
        };
        let updated = uc.execute(id, patch).await.unwrap();

        assert_eq!(updated.vol, Some(12.5));
        assert_eq!(updated.total_implied_vol, Some(30.0));
        assert_eq!(updated.clean_implied_vol, None);
    }
}
