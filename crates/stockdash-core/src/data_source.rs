//! Quote provider contract and request/response types.
//!
//! The aggregator talks to the outside world only through [`QuoteProvider`],
//! which exposes the two provider operations the dashboard needs.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | Historical prices | [`HistoricalRequest`] | `Vec<HistoryPoint>` |
//! | Summary statistics | [`SummaryRequest`] | [`SummaryStats`] |
//!
//! ```rust,ignore
//! use stockdash_core::{QuoteProvider, SummaryRequest, TickerSymbol, YahooAdapter};
//!
//! async fn pe(provider: &YahooAdapter) -> Result<Option<f64>, SourceError> {
//!     let request = SummaryRequest::dashboard(TickerSymbol::parse("AAPL")?);
//!     Ok(provider.quote_summary(request).await?.forward_pe())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{HistoryPoint, SummaryStats, TickerSymbol, UtcDateTime};

/// What went wrong on the provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure or an upstream status with no better mapping.
    Unavailable,
    RateLimited,
    InvalidRequest,
    /// Unknown or delisted ticker.
    NotFound,
    /// The provider answered with something unparseable.
    Internal,
}

impl SourceErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unavailable => "source.unavailable",
            Self::RateLimited => "source.rate_limited",
            Self::InvalidRequest => "source.invalid_request",
            Self::NotFound => "source.not_found",
            Self::Internal => "source.internal",
        }
    }
}

/// Provider failure for one call. Informational `retryable`: nothing in this
/// crate retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn with_kind(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Unavailable | SourceErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Daily price history request covering `[period1, period2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalRequest {
    pub ticker: TickerSymbol,
    pub period1: UtcDateTime,
    pub period2: UtcDateTime,
}

impl HistoricalRequest {
    /// Daily bars from midnight UTC of `start` up to `end`.
    pub fn daily(ticker: TickerSymbol, start: Date, end: UtcDateTime) -> Result<Self, SourceError> {
        let period1 = UtcDateTime::start_of_day(start);
        if period1 >= end {
            return Err(SourceError::invalid_request(format!(
                "history start {period1} must be before end {end}"
            )));
        }

        Ok(Self {
            ticker,
            period1,
            period2: end,
        })
    }
}

/// Summary module names understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryModule {
    SummaryDetail,
    DefaultKeyStatistics,
    FinancialData,
    Earnings,
}

impl SummaryModule {
    /// Price-volume summary, key statistics, financial data and earnings.
    pub const DASHBOARD: [SummaryModule; 4] = [
        Self::SummaryDetail,
        Self::DefaultKeyStatistics,
        Self::FinancialData,
        Self::Earnings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SummaryDetail => "summaryDetail",
            Self::DefaultKeyStatistics => "defaultKeyStatistics",
            Self::FinancialData => "financialData",
            Self::Earnings => "earnings",
        }
    }
}

impl Display for SummaryModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics request for one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub ticker: TickerSymbol,
    pub modules: Vec<SummaryModule>,
}

impl SummaryRequest {
    /// The fixed module set the dashboard renders from.
    pub fn dashboard(ticker: TickerSymbol) -> Self {
        Self {
            ticker,
            modules: SummaryModule::DASHBOARD.to_vec(),
        }
    }

    pub fn modules_param(&self) -> String {
        self.modules
            .iter()
            .map(|module| module.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// External quote-data provider.
///
/// Implementations must be `Send + Sync`; one provider instance serves every
/// concurrent request of the process.
pub trait QuoteProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Daily price history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] for transport failures, unknown tickers,
    /// rate limiting or undecodable responses.
    fn historical<'a>(
        &'a self,
        req: HistoricalRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoryPoint>, SourceError>> + Send + 'a>>;

    /// Summary statistics for the requested modules.
    ///
    /// # Errors
    ///
    /// Same classification as [`historical`](QuoteProvider::historical).
    fn quote_summary<'a>(
        &'a self,
        req: SummaryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SummaryStats, SourceError>> + Send + 'a>>;
}
