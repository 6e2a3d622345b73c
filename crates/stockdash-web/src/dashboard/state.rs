use stockdash_core::{RangeToken, StockResultSet};

use super::client::FetchError;

/// One outbound dashboard request: the ticker text and range it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub tickers: String,
    pub range: RangeToken,
}

/// Dashboard session state.
///
/// The range selector is two-state: `pending_range` is the range of the
/// request in flight, `confirmed_range` the range of the data on screen. A
/// failed request drops the pending range and leaves data and confirmed range
/// as they were.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    ticker_input: String,
    data: Option<StockResultSet>,
    confirmed_range: RangeToken,
    pending_range: Option<RangeToken>,
    last_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticker_input(&self) -> &str {
        &self.ticker_input
    }

    pub fn data(&self) -> Option<&StockResultSet> {
        self.data.as_ref()
    }

    pub fn confirmed_range(&self) -> RangeToken {
        self.confirmed_range
    }

    pub fn pending_range(&self) -> Option<RangeToken> {
        self.pending_range
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_ticker_input(&mut self, text: impl Into<String>) {
        self.ticker_input = text.into();
    }

    /// Start a fetch over `range`. Returns `None`, touching nothing, when the
    /// ticker input is blank.
    pub fn begin_fetch(&mut self, range: RangeToken) -> Option<FetchTicket> {
        let tickers = self.ticker_input.trim();
        if tickers.is_empty() {
            return None;
        }

        self.pending_range = Some(range);
        Some(FetchTicket {
            tickers: tickers.to_owned(),
            range,
        })
    }

    /// Apply the outcome of `ticket`. Whichever response completes last wins.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<StockResultSet, FetchError>,
    ) {
        if self.pending_range == Some(ticket.range) {
            self.pending_range = None;
        }

        match outcome {
            Ok(results) => {
                self.data = Some(results);
                self.confirmed_range = ticket.range;
                self.last_error = None;
            }
            Err(error) => {
                tracing::warn!(
                    tickers = %ticket.tickers,
                    range = %ticket.range,
                    %error,
                    "dashboard fetch failed"
                );
                self.last_error = Some(format!("Could not load {}: {error}", ticket.tickers));
            }
        }
    }
}
