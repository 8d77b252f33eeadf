//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::application::use_cases::IngestReport;
use crate::domain::Event;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Response for event list queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    /// The stored events matching the query.
    pub events: Vec<Event>,
}

/// Response for a single-event operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    /// The affected event.
    pub event: Event,
}

/// Response for an ingestion trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Human-readable status line.
    pub message: String,
    /// Instruments in scope for the run.
    pub instruments: usize,
    /// Candidates handed to the reconciler.
    pub candidates: usize,
    /// Newly created events.
    pub created: usize,
    /// Events refreshed in place.
    pub updated: usize,
    /// Candidates requiring no write.
    pub unchanged: usize,
    /// Candidates whose merge failed.
    pub failed: usize,
}

impl From<IngestReport> for RefreshResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            message: "Events fetched and stored successfully.".to_string(),
            instruments: report.instruments,
            candidates: report.candidates,
            created: report.summary.created,
            updated: report.summary.updated,
            unchanged: report.summary.unchanged,
            failed: report.summary.failed,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Create an error response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
