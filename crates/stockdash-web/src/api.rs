//! JSON route handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockdash_core::RangeToken;

use crate::app::AppState;

/// Body sent for every failed quote request. The cause goes to the log only.
pub const STOCK_FETCH_FAILED: &str = "Failed to fetch stock data";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api/stock/{tickers}?range={token}`
pub async fn stock(
    State(state): State<AppState>,
    Path(tickers): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let range = RangeToken::from_query(params.get("range").map(String::as_str));

    match state.aggregator.aggregate(&tickers, range).await {
        Ok(results) => {
            tracing::info!(%tickers, %range, records = results.len(), "served quotes");
            Json(results).into_response()
        }
        Err(error) => {
            tracing::error!(%tickers, %range, %error, "quote request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: STOCK_FETCH_FAILED.to_owned(),
                }),
            )
                .into_response()
        }
    }
}

/// Liveness probe.
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
