// Newsdesk - news submission form backed by Postgres and S3-compatible storage

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod submission;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
