use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use stockdash_core::{QuoteAggregator, YahooAdapter};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::cli::ServeArgs;
use crate::dashboard::{self, DashboardState, HttpStockApi, StockApi};
use crate::error::AppError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: QuoteAggregator,
    pub dashboard: Arc<Mutex<DashboardState>>,
    pub stock_api: Arc<dyn StockApi>,
}

impl AppState {
    pub fn new(aggregator: QuoteAggregator, stock_api: Arc<dyn StockApi>) -> Self {
        Self {
            aggregator,
            dashboard: Arc::new(Mutex::new(DashboardState::new())),
            stock_api,
        }
    }
}

/// Quote endpoint, health probe and dashboard behind permissive CORS and
/// request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::liveness))
        .route("/api/stock/:tickers", get(api::stock))
        .merge(dashboard::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(args: &ServeArgs) -> Result<(), AppError> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|_| AppError::InvalidAddress(format!("{}:{}", args.host, args.port)))?;

    let state = AppState::new(
        QuoteAggregator::new(Arc::new(YahooAdapter::default())),
        Arc::new(HttpStockApi::new(args.api_base_url.clone())),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        api_base_url = %args.api_base_url,
        "stockdash v{} listening",
        env!("CARGO_PKG_VERSION")
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
