//! Live market-data adapters.
//!
//! One shared HTTP client with retry/backoff, and one adapter per upstream
//! capability: instrument directory, macro calendar, corporate actions.

mod api_types;
mod client;
mod corporate_actions;
mod directory;
mod macro_api;

pub use api_types::{ApiMacroRow, StockListing};
pub use client::{ApiError, MarketDataHttpClient};
pub use corporate_actions::ApiCorporateActionsSource;
pub use directory::ApiInstrumentDirectory;
pub use macro_api::ApiMacroCalendar;
