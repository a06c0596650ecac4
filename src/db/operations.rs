use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use super::{LogRepository, NewsRepository};
use crate::models::{LogEntry, NewLogEntry, NewsItem};
use crate::types::QueryError;

/// Postgres-backed store for both tables. Every call is one autocommit
/// statement bounded by `timeout`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.map_err(QueryError::from),
            Err(_) => Err(QueryError::Timeout { after: self.timeout }),
        }
    }
}

#[async_trait]
impl NewsRepository for PgStore {
    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, QueryError> {
        self.bounded(
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM news WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn insert_news(&self, item: &NewsItem) -> Result<(), QueryError> {
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO news (id, slug, image, title, source_url, description)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id)
            .bind(&item.slug)
            .bind(&item.image)
            .bind(&item.title)
            .bind(&item.source_url)
            .bind(&item.description)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LogRepository for PgStore {
    async fn insert_log(&self, entry: &NewLogEntry) -> Result<(), QueryError> {
        self.bounded(
            sqlx::query("INSERT INTO logs (level, message, source) VALUES ($1, $2, $3)")
                .bind(entry.level.as_str())
                .bind(&entry.message)
                .bind(&entry.source)
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, QueryError> {
        self.bounded(
            sqlx::query_as::<_, LogEntry>(
                r#"
                SELECT id, level, message, source, created_at
                FROM logs
                ORDER BY created_at DESC, id DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await
    }
}
