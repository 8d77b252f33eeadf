//! Use cases - orchestration of ports and services.

mod apply_overlay;
mod ingest_events;
mod query_events;

pub use apply_overlay::{ApplyOverlayUseCase, OverlayError};
pub use ingest_events::{IngestEventsUseCase, IngestReport};
pub use query_events::QueryEventsUseCase;
