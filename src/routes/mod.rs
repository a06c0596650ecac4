//! HTTP routes
//!
//! - `GET /` - submission form plus the latest request logs
//! - `POST /add` - multipart news submission
//! - `GET /health` - liveness probe
//!
//! Every request, including unmatched ones, passes through the request logger.

pub mod health;
pub mod news;
pub mod ui;

use axum::{http::StatusCode, middleware, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::log_request;
use crate::models::AppState;

pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let request_log = state.request_log.clone();

    Router::new()
        .merge(ui::router(state.clone()))
        .merge(news::router(state))
        .merge(health::router())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(request_log, log_request)),
        )
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
