//! HTTP boundary - the trigger and query surface.

mod controller;
mod response;

pub use controller::{AppState, create_router};
pub use response::{ErrorResponse, EventResponse, EventsResponse, HealthResponse, RefreshResponse};
