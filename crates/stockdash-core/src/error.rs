use thiserror::Error;

use crate::data_source::SourceError;
use crate::TickerSymbol;

/// Validation and contract errors exposed by `stockdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker symbol cannot be empty")]
    EmptySymbol,

    #[error("invalid range '{value}', expected one of 1M, 6M, 1Y, 5Y")]
    InvalidRange { value: String },

    #[error("lookback window from {value} falls outside the supported calendar")]
    DateOutOfRange { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Failure of a whole aggregate call. No partial result set accompanies it.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("provider failed for {ticker}: {source}")]
    Provider {
        ticker: TickerSymbol,
        #[source]
        source: SourceError,
    },
}

impl AggregateError {
    /// Ticker whose fetch aborted the call, when a provider call was the cause.
    pub fn ticker(&self) -> Option<&TickerSymbol> {
        match self {
            Self::Validation(_) => None,
            Self::Provider { ticker, .. } => Some(ticker),
        }
    }
}
