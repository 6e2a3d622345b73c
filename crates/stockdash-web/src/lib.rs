//! # Stockdash Web
//!
//! HTTP surface for stockdash: the `GET /api/stock/{tickers}` quote endpoint
//! and the server-rendered comparison dashboard that consumes it.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /api/stock/{tickers}?range=` | [`api::stock`] |
//! | `GET /health` | [`api::liveness`] |
//! | `GET /` | dashboard page |
//! | `GET /fetch?tickers=` | dashboard Fetch button |
//! | `GET /range/{token}` | dashboard range selector |

pub mod api;
pub mod app;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod telemetry;

pub use app::{router, serve, AppState};
pub use error::AppError;
