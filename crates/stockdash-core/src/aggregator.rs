//! Per-ticker assembly of history and summary statistics.
//!
//! All tickers are fetched concurrently and joined fail-fast: the first
//! provider error drops the in-flight fetches and fails the whole call, so a
//! caller either gets one record per requested ticker or nothing.

use std::sync::Arc;

use futures::future::try_join_all;
use time::Date;

use crate::data_source::{HistoricalRequest, QuoteProvider, SummaryRequest};
use crate::{AggregateError, RangeToken, StockRecord, StockResultSet, TickerSymbol, UtcDateTime};

/// Builds a [`StockResultSet`] from a [`QuoteProvider`].
#[derive(Clone)]
pub struct QuoteAggregator {
    provider: Arc<dyn QuoteProvider>,
}

impl QuoteAggregator {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self { provider }
    }

    /// Fetch a comma-separated ticker list over `range`, ending now.
    pub async fn aggregate(
        &self,
        tickers: &str,
        range: RangeToken,
    ) -> Result<StockResultSet, AggregateError> {
        let symbols = TickerSymbol::parse_list(tickers)?;
        self.aggregate_symbols(&symbols, range, UtcDateTime::now())
            .await
    }

    /// Fetch `tickers` over the window `range` ends at `now`. Result keys keep
    /// the input order; a repeated ticker is fetched again and keeps its
    /// first position.
    pub async fn aggregate_symbols(
        &self,
        tickers: &[TickerSymbol],
        range: RangeToken,
        now: UtcDateTime,
    ) -> Result<StockResultSet, AggregateError> {
        let start = range.start_date(now.into_inner())?;
        tracing::debug!(
            provider = self.provider.name(),
            tickers = tickers.len(),
            %range,
            %start,
            "aggregating quotes"
        );

        let fetches = tickers
            .iter()
            .map(|ticker| self.fetch_record(ticker.clone(), start, now));
        let records = try_join_all(fetches).await.inspect_err(|error| {
            tracing::warn!(%error, "aggregate aborted");
        })?;

        Ok(records.into_iter().collect())
    }

    async fn fetch_record(
        &self,
        ticker: TickerSymbol,
        start: Date,
        now: UtcDateTime,
    ) -> Result<(TickerSymbol, StockRecord), AggregateError> {
        let provider_error = |source| AggregateError::Provider {
            ticker: ticker.clone(),
            source,
        };

        let history_request =
            HistoricalRequest::daily(ticker.clone(), start, now).map_err(provider_error)?;
        let summary_request = SummaryRequest::dashboard(ticker.clone());

        let (history, summary) = tokio::try_join!(
            self.provider.historical(history_request),
            self.provider.quote_summary(summary_request),
        )
        .map_err(provider_error)?;

        tracing::debug!(%ticker, points = history.len(), "fetched ticker");
        Ok((ticker, StockRecord { history, summary }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceError;
    use crate::{HistoryPoint, SummaryStats};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        failing: Option<&'static str>,
        periods: Mutex<Vec<(String, UtcDateTime)>>,
    }

    impl QuoteProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn historical<'a>(
            &'a self,
            req: HistoricalRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoryPoint>, SourceError>> + Send + 'a>> {
            self.periods
                .lock()
                .expect("period store should not be poisoned")
                .push((req.ticker.to_string(), req.period1));
            let failing = self.failing == Some(req.ticker.as_str());
            Box::pin(async move {
                if failing {
                    return Err(SourceError::not_found("no such ticker"));
                }
                Ok(vec![HistoryPoint::new(req.period2, 10.0)])
            })
        }

        fn quote_summary<'a>(
            &'a self,
            _req: SummaryRequest,
        ) -> Pin<Box<dyn Future<Output = Result<SummaryStats, SourceError>> + Send + 'a>> {
            Box::pin(async { Ok(SummaryStats::default()) })
        }
    }

    fn now() -> UtcDateTime {
        UtcDateTime::parse("2024-07-15T13:45:00Z").expect("timestamp")
    }

    #[tokio::test]
    async fn history_window_starts_at_resolved_date() {
        let provider = Arc::new(RecordingProvider::default());
        let aggregator = QuoteAggregator::new(provider.clone());
        let tickers = TickerSymbol::parse_list("AAPL").expect("tickers");

        aggregator
            .aggregate_symbols(&tickers, RangeToken::SixMonths, now())
            .await
            .expect("aggregate should succeed");

        let periods = provider.periods.lock().expect("not poisoned").clone();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].1.to_string(), "2024-01-15T00:00:00Z");
    }

    #[tokio::test]
    async fn failing_ticker_reports_its_symbol() {
        let provider = Arc::new(RecordingProvider {
            failing: Some("ZZZZ"),
            ..RecordingProvider::default()
        });
        let aggregator = QuoteAggregator::new(provider);
        let tickers = TickerSymbol::parse_list("AAPL,zzzz").expect("tickers");

        let error = aggregator
            .aggregate_symbols(&tickers, RangeToken::OneYear, now())
            .await
            .expect_err("must fail");
        assert_eq!(error.ticker().map(TickerSymbol::as_str), Some("ZZZZ"));
    }

    #[tokio::test]
    async fn malformed_list_fails_before_any_fetch() {
        let provider = Arc::new(RecordingProvider::default());
        let aggregator = QuoteAggregator::new(provider.clone());

        let error = aggregator
            .aggregate("AAPL,,MSFT", RangeToken::OneYear)
            .await
            .expect_err("must fail");
        assert!(matches!(error, AggregateError::Validation(_)));
        assert!(provider.periods.lock().expect("not poisoned").is_empty());
    }
}
