//! Instrument model: a tradable symbol and its quote currency.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// A ticker symbol.
///
/// Normalized to uppercase with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate the symbol for use in a natural key.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An instrument as reported by the instrument directory.
///
/// Immutable for the lifetime of a reconciliation run. The currency is used
/// to match macro-economic events against the instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Quote currency, uppercased and trimmed (e.g. "USD").
    pub currency: String,
}

impl Instrument {
    /// Create an instrument, normalizing the currency.
    #[must_use]
    pub fn new(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            currency: currency.into().trim().to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes_case_and_whitespace() {
        assert_eq!(Symbol::new(" tsla ").as_str(), "TSLA");
    }

    #[test]
    fn symbol_validate_rejects_empty() {
        assert!(Symbol::new("  ").validate().is_err());
        assert!(Symbol::new("AAPL").validate().is_ok());
    }

    #[test]
    fn instrument_normalizes_currency() {
        let instrument = Instrument::new("aapl", " usd ");
        assert_eq!(instrument.symbol.as_str(), "AAPL");
        assert_eq!(instrument.currency, "USD");
    }
}
