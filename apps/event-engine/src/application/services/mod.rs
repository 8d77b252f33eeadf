//! Application services - the normalization and reconciliation engines.

pub mod normalizer;
pub mod reconciler;

pub use reconciler::{MergeOutcome, ReconcileSummary, Reconciler};
