//! # Domain Models
//!
//! Canonical types shared by the aggregator, the HTTP endpoint and the
//! dashboard.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TickerSymbol`] | Uppercase-normalized ticker |
//! | [`RangeToken`] | Lookback selector (`1M`, `6M`, `1Y`, `5Y`) |
//! | [`HistoryPoint`] | Daily close with pass-through OHLCV fields |
//! | [`SummaryStats`] | Optional summary modules (key statistics, financial data, earnings) |
//! | [`StockRecord`] | History plus summary for one ticker |
//! | [`StockResultSet`] | Insertion-ordered ticker → record map |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! ```rust
//! use stockdash_core::{RangeToken, TickerSymbol};
//!
//! let ticker = TickerSymbol::parse("aapl").unwrap();
//! assert_eq!(ticker.as_str(), "AAPL");
//! assert_eq!(RangeToken::from_query(Some("bogus")), RangeToken::OneYear);
//! ```

mod models;
pub mod range;
mod symbol;
mod timestamp;

pub use models::{
    Earnings, EarningsChart, FinancialData, FormattedValue, HistoryPoint, KeyStatistics,
    QuarterlyEarnings, StockRecord, StockResultSet, SummaryStats,
};
pub use range::{resolve, RangeToken};
pub use symbol::TickerSymbol;
pub use timestamp::UtcDateTime;
