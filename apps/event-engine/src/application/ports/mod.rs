//! Ports - interfaces between the application core and the outside world.
//!
//! Driven ports are implemented by infrastructure adapters; the use cases
//! depend only on the traits defined here.

mod event_store;
mod macro_calendar;
mod market_data;

pub use event_store::{EventStore, StoreError};
pub use macro_calendar::{MacroCalendar, MacroFetch, RawMacroEvent};
pub use market_data::{
    CorporateActionBundle, CorporateActionsSource, InstrumentDirectory, RawDividend, RawEarnings,
    RawMerger, RawSplit,
};
