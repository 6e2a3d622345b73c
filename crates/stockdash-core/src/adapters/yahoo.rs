use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::data_source::{HistoricalRequest, QuoteProvider, SourceError, SummaryRequest};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{HistoryPoint, SummaryStats, TickerSymbol, UtcDateTime};

const DEFAULT_SESSION_URL: &str = "https://fc.yahoo.com";
const DEFAULT_QUERY_BASE: &str = "https://query2.finance.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::from_secs(3600);
const CRUMB_ENV: &str = "YAHOO_CRUMB";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb session
// ============================================================================

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    fetched_at: Instant,
}

/// Caches the crumb token Yahoo requires on `quoteSummary` calls.
///
/// The session cookie lives in the transport's cookie jar; only the crumb is
/// held here. Refreshes are serialized behind the lock so concurrent ticker
/// fetches share one bootstrap.
#[derive(Debug)]
pub struct YahooAuthManager {
    crumb: Mutex<Option<CachedCrumb>>,
    ttl: Duration,
    fixed_crumb: Option<String>,
}

impl Default for YahooAuthManager {
    /// Picks up `YAHOO_CRUMB` when it is set.
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl: CRUMB_TTL,
            fixed_crumb: std::env::var(CRUMB_ENV).ok().filter(|crumb| !crumb.is_empty()),
        }
    }
}

impl YahooAuthManager {
    /// A manager that always asks Yahoo for the crumb, ignoring `YAHOO_CRUMB`.
    pub fn without_env_override() -> Self {
        Self {
            fixed_crumb: None,
            ..Self::default()
        }
    }

    /// A manager that skips the `getcrumb` call and sends `crumb` instead.
    /// The session cookie is still fetched, since Yahoo ties the crumb to it.
    pub fn with_fixed_crumb(crumb: impl Into<String>) -> Self {
        Self {
            fixed_crumb: Some(crumb.into()),
            ..Self::default()
        }
    }

    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        endpoints: &YahooEndpoints,
    ) -> Result<String, SourceError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            if crumb.fetched_at.elapsed() < self.ttl {
                return Ok(crumb.value.clone());
            }
        }

        open_session(http_client, endpoints).await?;
        let value = match &self.fixed_crumb {
            Some(crumb) => crumb.clone(),
            None => fetch_crumb(http_client, endpoints).await?,
        };
        tracing::debug!(fixed = self.fixed_crumb.is_some(), "refreshed yahoo crumb");
        *cached = Some(CachedCrumb {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drop the cached crumb; the next call bootstraps a fresh session.
    pub async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

/// Any status is fine here: the response only has to set the session cookie.
async fn open_session(
    http_client: &dyn HttpClient,
    endpoints: &YahooEndpoints,
) -> Result<(), SourceError> {
    let request =
        HttpRequest::get(endpoints.session_url.as_str()).with_header("referer", REFERER);
    http_client.execute(request).await.map_err(|e| {
        SourceError::unavailable(format!("failed to fetch yahoo session cookie: {e}"))
    })?;
    Ok(())
}

async fn fetch_crumb(
    http_client: &dyn HttpClient,
    endpoints: &YahooEndpoints,
) -> Result<String, SourceError> {
    let crumb_request = HttpRequest::get(format!("{}/v1/test/getcrumb", endpoints.query_base))
        .with_header("referer", REFERER);
    let response = http_client.execute(crumb_request).await.map_err(|e| {
        SourceError::unavailable(format!("failed to fetch yahoo crumb: {e}"))
    })?;

    if response.status == 429 {
        return Err(SourceError::rate_limited("yahoo rate limited the crumb request"));
    }
    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "yahoo crumb endpoint returned status {}",
            response.status
        )));
    }

    let body = response.body.trim();
    if body.is_empty() || body.len() >= 100 || body.contains(' ') || body.contains('<') {
        return Err(SourceError::unavailable("yahoo returned an unusable crumb"));
    }

    Ok(body.to_owned())
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

#[derive(Debug, Clone)]
struct YahooEndpoints {
    session_url: String,
    query_base: String,
}

impl Default for YahooEndpoints {
    fn default() -> Self {
        Self {
            session_url: String::from(DEFAULT_SESSION_URL),
            query_base: String::from(DEFAULT_QUERY_BASE),
        }
    }
}

/// Yahoo Finance provider: v8 chart endpoint for history, v10 quoteSummary
/// for statistics.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_manager: Arc<YahooAuthManager>,
    endpoints: YahooEndpoints,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth_manager: Arc::new(YahooAuthManager::default()),
            endpoints: YahooEndpoints::default(),
        }
    }

    /// Point the adapter at alternative hosts (local fixtures, proxies).
    pub fn with_base_urls(
        http_client: Arc<dyn HttpClient>,
        session_url: impl Into<String>,
        query_base: impl Into<String>,
    ) -> Self {
        Self {
            endpoints: YahooEndpoints {
                session_url: session_url.into(),
                query_base: query_base.into().trim_end_matches('/').to_owned(),
            },
            ..Self::new(http_client)
        }
    }

    pub fn with_auth_manager(mut self, auth_manager: Arc<YahooAuthManager>) -> Self {
        self.auth_manager = auth_manager;
        self
    }

    async fn fetch_history(
        &self,
        req: &HistoricalRequest,
    ) -> Result<Vec<HistoryPoint>, SourceError> {
        let endpoint = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history&includeAdjustedClose=true",
            self.endpoints.query_base,
            urlencoding::encode(req.ticker.as_str()),
            req.period1.into_inner().unix_timestamp(),
            req.period2.into_inner().unix_timestamp(),
        );

        tracing::debug!(ticker = %req.ticker, "requesting yahoo chart");
        let response = self.get(&endpoint, &req.ticker).await?;
        parse_chart_response(&response.body, &req.ticker)
    }

    async fn fetch_summary(&self, req: &SummaryRequest) -> Result<SummaryStats, SourceError> {
        let crumb = self
            .auth_manager
            .crumb(self.http_client.as_ref(), &self.endpoints)
            .await?;

        let endpoint = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            self.endpoints.query_base,
            urlencoding::encode(req.ticker.as_str()),
            req.modules_param(),
            urlencoding::encode(&crumb)
        );

        tracing::debug!(
            ticker = %req.ticker,
            modules = %req.modules_param(),
            "requesting yahoo quoteSummary"
        );
        let response = self.send(&endpoint).await?;
        if matches!(response.status, 401 | 403) {
            self.auth_manager.invalidate().await;
        }
        let response = classify_status(response, &req.ticker)?;
        parse_summary_response(&response.body, &req.ticker)
    }

    async fn get(
        &self,
        endpoint: &str,
        ticker: &TickerSymbol,
    ) -> Result<HttpResponse, SourceError> {
        let response = self.send(endpoint).await?;
        classify_status(response, ticker)
    }

    /// Single GET. No retries: callers see the first failure.
    async fn send(&self, endpoint: &str) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(endpoint).with_header("referer", REFERER);

        self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {e}"))
        })
    }
}

impl QuoteProvider for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn historical<'a>(
        &'a self,
        req: HistoricalRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoryPoint>, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_history(&req).await })
    }

    fn quote_summary<'a>(
        &'a self,
        req: SummaryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SummaryStats, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_summary(&req).await })
    }
}

fn parse_chart_response(
    body: &str,
    ticker: &TickerSymbol,
) -> Result<Vec<HistoryPoint>, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        return Err(api_error(error, ticker));
    }

    let result = chart_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("yahoo chart has no result for {ticker}")))?;

    // A window without trading days comes back without timestamps.
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut history = Vec::with_capacity(timestamps.len());
    for (i, seconds) in timestamps.into_iter().enumerate() {
        let Some(close) = value_at(&quote.close, i) else {
            continue;
        };
        let date = UtcDateTime::from_unix_timestamp(seconds)
            .map_err(|e| SourceError::internal(format!("invalid chart timestamp: {e}")))?;

        history.push(HistoryPoint {
            date,
            open: value_at(&quote.open, i),
            high: value_at(&quote.high, i),
            low: value_at(&quote.low, i),
            close,
            adj_close: value_at(&adjclose, i),
            volume: value_at(&quote.volume, i).map(|volume| volume as u64),
        });
    }

    Ok(history)
}

fn parse_summary_response(body: &str, ticker: &TickerSymbol) -> Result<SummaryStats, SourceError> {
    let summary_response: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo quoteSummary: {e}")))?;

    if let Some(error) = summary_response.quote_summary.error {
        return Err(api_error(error, ticker));
    }

    summary_response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| {
            SourceError::not_found(format!("yahoo quoteSummary has no result for {ticker}"))
        })
}

fn classify_status(
    response: HttpResponse,
    ticker: &TickerSymbol,
) -> Result<HttpResponse, SourceError> {
    match response.status {
        status if (200..300).contains(&status) => Ok(response),
        status @ (401 | 403) => Err(SourceError::unavailable(format!(
            "yahoo rejected the session for {ticker} (status {status})"
        ))),
        404 => Err(SourceError::not_found(format!("yahoo has no data for {ticker}"))),
        429 => Err(SourceError::rate_limited(format!(
            "yahoo rate limited the request for {ticker}"
        ))),
        status => Err(SourceError::unavailable(format!(
            "yahoo returned status {status} for {ticker}"
        ))),
    }
}

fn api_error(error: YahooApiError, ticker: &TickerSymbol) -> SourceError {
    let description = error.description.unwrap_or_default();
    if error.code.eq_ignore_ascii_case("not found") {
        SourceError::not_found(format!("yahoo: {ticker}: {description}"))
    } else {
        SourceError::unavailable(format!("yahoo {} for {ticker}: {description}", error.code))
    }
}

fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series
        .get(index)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}

// ============================================================================
// Yahoo API response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuoteIndicator>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooQuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<SummaryStats>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}
