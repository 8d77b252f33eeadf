//! Validation errors for raw records entering the domain.

use thiserror::Error;

/// A validation failure while normalizing a raw record.
///
/// These are record-level failures: the offending record is dropped and
/// logged, never persisted with placeholder values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A date field could not be parsed into a timestamp.
    #[error("invalid date: {value:?}")]
    InvalidDate {
        /// The raw date value as received.
        value: String,
    },

    /// A required label field was absent or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// The instrument symbol was empty.
    #[error("instrument symbol is empty")]
    EmptySymbol,
}
