use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Uppercase ticker, e.g. `AAPL`, `BRK-B`, `^GSPC`, `M&M.NS`.
///
/// Result keys use this form, so `aapl` and `AAPL` name the same record.
/// Beyond that the text is left to the provider to accept or reject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim() {
            "" => Err(ValidationError::EmptySymbol),
            symbol => Ok(Self(symbol.to_ascii_uppercase())),
        }
    }

    /// Comma-separated list in input order. Every element must parse; an
    /// empty element (`"AAPL,,MSFT"`, `"AAPL,"`) fails the whole list.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ValidationError> {
        input.split(',').map(Self::parse).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, ValidationError> {
        Self::parse(&raw)
    }
}

impl From<TickerSymbol> for String {
    fn from(symbol: TickerSymbol) -> Self {
        symbol.0
    }
}
