//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases. Handlers
//! stay thin: extract, call the use case, map the error kind to a status.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::application::ports::{
    CorporateActionsSource, EventStore, InstrumentDirectory, MacroCalendar,
};
use crate::application::use_cases::{
    ApplyOverlayUseCase, IngestEventsUseCase, OverlayError, QueryEventsUseCase,
};
use crate::domain::{OverlayPatch, Symbol};

use super::response::{
    ErrorResponse, EventResponse, EventsResponse, HealthResponse, RefreshResponse,
};

/// Application state shared across handlers.
pub struct AppState<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    /// Use case for read queries.
    pub query_events: Arc<QueryEventsUseCase<D, P, F, C, S>>,
    /// Use case for triggering a full ingestion run.
    pub ingest_events: Arc<IngestEventsUseCase<D, P, F, C, S>>,
    /// Use case for analyst overlay edits.
    pub apply_overlay: Arc<ApplyOverlayUseCase<S>>,
    /// Application version.
    pub version: String,
}

impl<D, P, F, C, S> Clone for AppState<D, P, F, C, S>
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    fn clone(&self) -> Self {
        Self {
            query_events: Arc::clone(&self.query_events),
            ingest_events: Arc::clone(&self.ingest_events),
            apply_overlay: Arc::clone(&self.apply_overlay),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<D, P, F, C, S>(state: AppState<D, P, F, C, S>) -> Router
where
    D: InstrumentDirectory + 'static,
    P: MacroCalendar + 'static,
    F: MacroCalendar + 'static,
    C: CorporateActionsSource + 'static,
    S: EventStore + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(list_events))
        .route("/api/events/refresh", post(refresh_events))
        .route("/api/events/{id}", put(update_event))
        .with_state(state)
}

/// Query parameters for the event list endpoint.
#[derive(Debug, Deserialize)]
struct EventsQuery {
    /// Restrict results to one ticker.
    ticker: Option<String>,
}

/// Health check endpoint.
async fn health_check<D, P, F, C, S>(State(state): State<AppState<D, P, F, C, S>>) -> impl IntoResponse
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// List stored events, optionally filtered by ticker. A filtered miss runs
/// one on-demand ingestion for that ticker before answering.
async fn list_events<D, P, F, C, S>(
    State(state): State<AppState<D, P, F, C, S>>,
    Query(params): Query<EventsQuery>,
) -> impl IntoResponse
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    let ticker = params
        .ticker
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Symbol::new);

    match state.query_events.list_events(ticker.as_ref()).await {
        Ok(events) => (StatusCode::OK, Json(EventsResponse { events })).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "failed to list events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal Server Error")),
            )
                .into_response()
        }
    }
}

/// Trigger a full-universe ingestion run.
async fn refresh_events<D, P, F, C, S>(
    State(state): State<AppState<D, P, F, C, S>>,
) -> impl IntoResponse
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    let report = state.ingest_events.run_full().await;
    (StatusCode::OK, Json(RefreshResponse::from(report)))
}

/// Apply analyst overlay fields to one event. Unknown body fields are
/// ignored; a body carrying none of the editable fields is a bad request.
async fn update_event<D, P, F, C, S>(
    State(state): State<AppState<D, P, F, C, S>>,
    Path(id): Path<i64>,
    Json(patch): Json<OverlayPatch>,
) -> impl IntoResponse
where
    D: InstrumentDirectory,
    P: MacroCalendar,
    F: MacroCalendar,
    C: CorporateActionsSource,
    S: EventStore,
{
    match state.apply_overlay.execute(id, patch).await {
        Ok(event) => (StatusCode::OK, Json(EventResponse { event })).into_response(),
        Err(OverlayError::NoValidFields) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No valid fields to update")),
        )
            .into_response(),
        Err(OverlayError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Event not found")),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(id = id, error = %error, "overlay update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal Server Error")),
            )
                .into_response()
        }
    }
}
