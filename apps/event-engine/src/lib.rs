// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Event Engine - Market Event Reconciliation Core
//!
//! Tracks market-moving events (macro-economic releases, dividends, earnings,
//! splits, mergers) per instrument and serves them to a dashboard. The heart
//! of the crate is the reconciliation engine: heterogeneous upstream feeds
//! are normalized into one canonical schema, classified for market impact,
//! and merged into durable storage under a `(ticker, event_date)` natural key
//! so that repeated observation of the same logical event never duplicates or
//! contradicts stored state.
//!
//! # Architecture (Hexagonal)
//!
//! - **Domain**: canonical entities and pure logic
//!   - `event`: the persisted `Event`, drafts, overlays, natural key
//!   - `instrument`: symbol and currency model
//!   - `impact`: the coarse impact heuristic
//!
//! - **Application**: ports, services, use cases
//!   - `ports`: `EventStore`, `InstrumentDirectory`, `MacroCalendar`,
//!     `CorporateActionsSource`
//!   - `services`: the normalizer and the reconciler
//!   - `use_cases`: `IngestEvents`, `QueryEvents`, `ApplyOverlay`
//!
//! - **Infrastructure**: adapters
//!   - `marketdata`: live HTTP adapters with retry/backoff
//!   - `calendar`: local CSV extract adapter
//!   - `persistence`: SQLite and in-memory event stores
//!   - `http`: the axum trigger/query surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - canonical entities and pure business logic.
pub mod domain;

/// Application layer - ports, services, and use cases.
pub mod application;

/// Infrastructure layer - adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Tracing initialization.
pub mod telemetry;

// Domain re-exports
pub use domain::{Event, EventDraft, EventType, Impact, Instrument, NaturalKey, OverlayPatch, Symbol};

// Application re-exports
pub use application::ports::{
    CorporateActionsSource, EventStore, InstrumentDirectory, MacroCalendar, StoreError,
};
pub use application::services::{MergeOutcome, ReconcileSummary, Reconciler};
pub use application::use_cases::{
    ApplyOverlayUseCase, IngestEventsUseCase, IngestReport, OverlayError, QueryEventsUseCase,
};

// Infrastructure re-exports
pub use infrastructure::calendar::CsvMacroCalendar;
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::marketdata::{
    ApiCorporateActionsSource, ApiInstrumentDirectory, ApiMacroCalendar, MarketDataHttpClient,
};
pub use infrastructure::persistence::{InMemoryEventStore, SqliteEventStore};
