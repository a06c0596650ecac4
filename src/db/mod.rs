use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{LogEntry, NewLogEntry, NewsItem};
use crate::types::QueryError;

pub use operations::*;

pub mod operations;

/// Queries against the `news` table.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, QueryError>;

    async fn insert_news(&self, item: &NewsItem) -> Result<(), QueryError>;
}

/// Queries against the `logs` table.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn insert_log(&self, entry: &NewLogEntry) -> Result<(), QueryError>;

    /// Newest first.
    async fn recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, QueryError>;
}

pub async fn create_pool(config: &DatabaseConfig, acquire_timeout: Duration) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(acquire_timeout)
        .connect(&config.url)
        .await?;

    // Test connection
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))
}
