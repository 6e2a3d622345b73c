//! Comparison dashboard served at `/`.
//!
//! The page is rendered on the server from one shared [`DashboardState`]. The
//! Fetch button and the range links are plain GET routes that update that
//! state through the quote endpoint and redirect back to `/`.

pub mod client;
pub mod page;
pub mod state;
pub mod view;

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use stockdash_core::RangeToken;

pub use client::{FetchError, HttpStockApi, StockApi, DEFAULT_API_BASE_URL};
pub use state::{DashboardState, FetchTicket};
pub use view::{EpsChart, LineChart, MetricsTable};

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/fetch", get(fetch))
        .route("/range/:token", get(select_range))
}

async fn index(State(state): State<AppState>) -> Response {
    let rendered = {
        let dashboard = state.dashboard.lock().await;
        page::render(&dashboard)
    };

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(error) => {
            tracing::error!(%error, "dashboard render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render dashboard").into_response()
        }
    }
}

/// Fetch button: store the typed tickers and reload them over the confirmed range.
async fn fetch(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Redirect {
    let ticket = {
        let mut dashboard = state.dashboard.lock().await;
        dashboard.set_ticker_input(params.get("tickers").map(String::as_str).unwrap_or_default());
        let range = dashboard.confirmed_range();
        dashboard.begin_fetch(range)
    };

    if let Some(ticket) = ticket {
        run_fetch(&state, ticket).await;
    }
    Redirect::to("/")
}

/// Range link: reload the stored tickers over the chosen range.
async fn select_range(State(state): State<AppState>, Path(token): Path<String>) -> Redirect {
    let range = RangeToken::from_query(Some(&token));
    let ticket = state.dashboard.lock().await.begin_fetch(range);

    if let Some(ticket) = ticket {
        run_fetch(&state, ticket).await;
    }
    Redirect::to("/")
}

// The state lock is released while the request is in flight so the page
// stays renderable and a second request can start.
async fn run_fetch(state: &AppState, ticket: FetchTicket) {
    tracing::info!(tickers = %ticket.tickers, range = %ticket.range, "dashboard fetch");
    let outcome = state.stock_api.fetch(&ticket.tickers, ticket.range).await;
    state.dashboard.lock().await.complete_fetch(ticket, outcome);
}
