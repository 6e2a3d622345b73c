use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use stockdash_core::{RangeToken, StockResultSet};
use thiserror::Error;

/// Loopback address of the quote endpoint the dashboard talks to.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Why a dashboard fetch produced no data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("could not reach the stock API: {0}")]
    Transport(String),

    #[error("stock API answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("stock API sent an unreadable body: {0}")]
    Decode(String),
}

/// Client side of `GET /api/stock/{tickers}?range={token}`.
pub trait StockApi: Send + Sync {
    fn fetch<'a>(
        &'a self,
        tickers: &'a str,
        range: RangeToken,
    ) -> Pin<Box<dyn Future<Output = Result<StockResultSet, FetchError>> + Send + 'a>>;
}

/// reqwest-backed [`StockApi`].
#[derive(Debug, Clone)]
pub struct HttpStockApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStockApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url_for(&self, tickers: &str, range: RangeToken) -> String {
        format!(
            "{}/api/stock/{}?range={}",
            self.base_url,
            urlencoding::encode(tickers),
            range
        )
    }
}

impl Default for HttpStockApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl StockApi for HttpStockApi {
    fn fetch<'a>(
        &'a self,
        tickers: &'a str,
        range: RangeToken,
    ) -> Pin<Box<dyn Future<Output = Result<StockResultSet, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url_for(tickers, range))
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !status.is_success() {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|body| body.error)
                    .unwrap_or(body);
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
        })
    }
}
