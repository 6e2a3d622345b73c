//! Contract tests for the Yahoo provider as seen through the aggregator.
//!
//! A stub transport stands in for Yahoo so these tests pin the exact upstream
//! calls made and the JSON shape handed to the endpoint.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use stockdash_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, QuoteAggregator, QuoteProvider, RangeToken,
    SourceErrorKind, SummaryRequest, TickerSymbol, UtcDateTime, YahooAdapter, YahooAuthManager,
};

const AAPL_CHART: &str = r#"{"chart":{"result":[{
    "timestamp":[1718631000,1718717400],
    "indicators":{"quote":[{"open":[213.4,214.7],"close":[216.7,214.3],"volume":[93728300,79943300]}],
                  "adjclose":[{"adjclose":[216.1,213.8]}]}}],"error":null}}"#;

const AAPL_SUMMARY: &str = r#"{"quoteSummary":{"result":[{
    "defaultKeyStatistics":{"forwardPE":{"raw":31.2,"fmt":"31.20"},"beta":{"raw":1.24}},
    "financialData":{"ebitda":{"raw":1.3e11,"fmt":"131.78B"}},
    "earnings":{"earningsChart":{"quarterly":[
        {"date":"2Q2023","actual":{"raw":1.26,"fmt":"1.26"}},
        {"date":"3Q2023","actual":{"raw":1.46,"fmt":"1.46"}}]}}}],"error":null}}"#;

const MSFT_CHART: &str = r#"{"chart":{"result":[{
    "timestamp":[1718631000],
    "indicators":{"quote":[{"close":[448.4]}]}}],"error":null}}"#;

// No defaultKeyStatistics or financialData: a young listing.
const MSFT_SUMMARY: &str = r#"{"quoteSummary":{"result":[{"summaryDetail":{}}],"error":null}}"#;

#[derive(Default)]
struct StubYahoo {
    routes: Vec<(&'static str, HttpResponse)>,
    requests: Mutex<Vec<String>>,
}

impl StubYahoo {
    fn route(mut self, fragment: &'static str, response: HttpResponse) -> Self {
        self.routes.push((fragment, response));
        self
    }

    fn session(self) -> Self {
        self.route("session.test", HttpResponse::new(404, ""))
            .route("/v1/test/getcrumb", HttpResponse::ok_json("crumb-1"))
    }

    fn urls(&self) -> Vec<String> {
        self.requests.lock().expect("not poisoned").clone()
    }
}

impl HttpClient for StubYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| HttpResponse::new(404, ""));
        self.requests.lock().expect("not poisoned").push(request.url);
        Box::pin(async move { Ok(response) })
    }
}

fn adapter(stub: Arc<StubYahoo>) -> YahooAdapter {
    YahooAdapter::with_base_urls(stub, "https://session.test", "https://query.test")
        .with_auth_manager(Arc::new(YahooAuthManager::without_env_override()))
}

fn two_ticker_stub() -> Arc<StubYahoo> {
    Arc::new(
        StubYahoo::default()
            .session()
            .route("/chart/AAPL?", HttpResponse::ok_json(AAPL_CHART))
            .route("/quoteSummary/AAPL?", HttpResponse::ok_json(AAPL_SUMMARY))
            .route("/chart/MSFT?", HttpResponse::ok_json(MSFT_CHART))
            .route("/quoteSummary/MSFT?", HttpResponse::ok_json(MSFT_SUMMARY)),
    )
}

fn now() -> UtcDateTime {
    UtcDateTime::parse("2024-06-19T20:00:00Z").expect("timestamp")
}

#[tokio::test]
async fn aggregated_result_matches_endpoint_wire_shape() {
    let stub = two_ticker_stub();
    let aggregator = QuoteAggregator::new(Arc::new(adapter(stub.clone())));
    let tickers = TickerSymbol::parse_list("aapl,MSFT").expect("tickers");

    let results = aggregator
        .aggregate_symbols(&tickers, RangeToken::OneMonth, now())
        .await
        .expect("aggregate should succeed");

    let body = serde_json::to_string(&results).expect("serialize");
    let aapl_at = body.find("\"AAPL\"").expect("AAPL key");
    let msft_at = body.find("\"MSFT\"").expect("MSFT key");
    assert!(aapl_at < msft_at, "keys must keep request order: {body}");

    let json: Value = serde_json::from_str(&body).expect("json");
    let aapl = &json["AAPL"];
    assert_eq!(aapl["history"][0]["date"], "2024-06-17T13:30:00Z");
    assert_eq!(aapl["history"][0]["close"], 216.7);
    assert_eq!(aapl["history"][1]["adjClose"], 213.8);
    assert_eq!(aapl["summary"]["defaultKeyStatistics"]["forwardPE"], 31.2);
    assert_eq!(aapl["summary"]["defaultKeyStatistics"]["beta"]["raw"], 1.24);
    assert_eq!(aapl["summary"]["financialData"]["ebitda"]["fmt"], "131.78B");
    assert_eq!(
        aapl["summary"]["earnings"]["earningsChart"]["quarterly"][1]["actual"]["raw"],
        1.46
    );

    let msft = &json["MSFT"];
    assert_eq!(msft["history"].as_array().map(Vec::len), Some(1));
    assert!(msft["summary"].get("defaultKeyStatistics").is_none());
    assert!(msft["summary"].get("financialData").is_none());
}

#[tokio::test]
async fn history_window_covers_resolved_range() {
    let stub = two_ticker_stub();
    let aggregator = QuoteAggregator::new(Arc::new(adapter(stub.clone())));
    let tickers = TickerSymbol::parse_list("AAPL").expect("tickers");

    aggregator
        .aggregate_symbols(&tickers, RangeToken::OneMonth, now())
        .await
        .expect("aggregate should succeed");

    // 2024-05-19T00:00:00Z through the moment of the request.
    let chart_url = stub
        .urls()
        .into_iter()
        .find(|url| url.contains("/v8/finance/chart/AAPL"))
        .expect("chart request");
    assert!(chart_url.contains("period1=1716076800"), "{chart_url}");
    assert!(chart_url.contains("period2=1718827200"), "{chart_url}");
    assert!(chart_url.contains("interval=1d"), "{chart_url}");
}

#[tokio::test]
async fn summary_request_asks_for_dashboard_modules_with_crumb() {
    let stub = two_ticker_stub();
    let provider = adapter(stub.clone());
    let request = SummaryRequest::dashboard(TickerSymbol::parse("AAPL").expect("ticker"));

    let summary = provider.quote_summary(request).await.expect("summary");
    assert_eq!(summary.forward_pe(), Some(31.2));
    assert_eq!(summary.ebitda_display(), Some("131.78B"));
    assert_eq!(summary.quarterly_earnings().len(), 2);

    let summary_url = stub
        .urls()
        .into_iter()
        .find(|url| url.contains("/v10/finance/quoteSummary/AAPL"))
        .expect("summary request");
    assert!(summary_url.contains("crumb=crumb-1"), "{summary_url}");
    for module in ["summaryDetail", "defaultKeyStatistics", "financialData", "earnings"] {
        assert!(summary_url.contains(module), "missing {module}: {summary_url}");
    }
}

#[tokio::test]
async fn crumb_is_bootstrapped_once_for_concurrent_tickers() {
    let stub = two_ticker_stub();
    let aggregator = QuoteAggregator::new(Arc::new(adapter(stub.clone())));
    let tickers = TickerSymbol::parse_list("AAPL,MSFT").expect("tickers");

    aggregator
        .aggregate_symbols(&tickers, RangeToken::OneYear, now())
        .await
        .expect("aggregate should succeed");

    let crumb_calls = stub
        .urls()
        .iter()
        .filter(|url| url.contains("/v1/test/getcrumb"))
        .count();
    assert_eq!(crumb_calls, 1);
}

#[tokio::test]
async fn unknown_ticker_surfaces_as_not_found_for_that_ticker() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let stub = Arc::new(
        StubYahoo::default()
            .session()
            .route("/chart/ZZZZ?", HttpResponse::new(404, body))
            .route("/quoteSummary/ZZZZ?", HttpResponse::new(404, "")),
    );
    let aggregator = QuoteAggregator::new(Arc::new(adapter(stub)));
    let tickers = TickerSymbol::parse_list("ZZZZ").expect("tickers");

    let error = aggregator
        .aggregate_symbols(&tickers, RangeToken::OneYear, now())
        .await
        .expect_err("must fail");

    assert_eq!(error.ticker().map(TickerSymbol::as_str), Some("ZZZZ"));
    match error {
        stockdash_core::AggregateError::Provider { source, .. } => {
            assert_eq!(source.kind(), SourceErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}
