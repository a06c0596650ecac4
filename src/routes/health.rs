use axum::{routing::get, Router};

pub const HEALTH_BODY: &str = "OK. All systems operational.";

pub fn router() -> Router {
    Router::new().route("/health", get(health_check))
}

// Liveness only: neither Postgres nor the bucket is contacted.
async fn health_check() -> &'static str {
    HEALTH_BODY
}
