//! # Stockdash Core
//!
//! Domain types, range resolution and quote aggregation behind the stockdash
//! comparison dashboard.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance) |
//! | [`aggregator`] | Fail-fast per-ticker aggregation |
//! | [`data_source`] | Provider trait and request types |
//! | [`domain`] | Tickers, ranges, history points, summary statistics |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdash_core::{QuoteAggregator, RangeToken, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = QuoteAggregator::new(Arc::new(YahooAdapter::default()));
//!     let results = aggregator.aggregate("AAPL,MSFT", RangeToken::SixMonths).await?;
//!
//!     for (ticker, record) in results.iter() {
//!         println!("{ticker}: {} closes", record.history.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ HTTP endpoint   │
//! └────────┬────────┘
//!          │ tickers + RangeToken
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ QuoteAggregator │────▶│ Range resolver   │
//! └────────┬────────┘     └──────────────────┘
//!          │ history + summary per ticker
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ QuoteProvider   │────▶│ HTTP Client      │
//! │ (YahooAdapter)  │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod aggregator;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;

pub use adapters::{YahooAdapter, YahooAuthManager};

pub use aggregator::QuoteAggregator;

pub use data_source::{
    HistoricalRequest, QuoteProvider, SourceError, SourceErrorKind, SummaryModule, SummaryRequest,
};

pub use domain::{
    resolve, Earnings, EarningsChart, FinancialData, FormattedValue, HistoryPoint, KeyStatistics,
    QuarterlyEarnings, RangeToken, StockRecord, StockResultSet, SummaryStats, TickerSymbol,
    UtcDateTime,
};

pub use error::{AggregateError, ValidationError};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
