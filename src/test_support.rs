// In-memory stand-ins for Postgres and the bucket, with failure switches

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::Barrier;
use url::Url;
use uuid::Uuid;

use crate::db::{LogRepository, NewsRepository};
use crate::middleware::RequestLogSink;
use crate::models::{AppState, LogEntry, NewLogEntry, NewsItem};
use crate::storage::ObjectStore;
use crate::submission::NewsSubmitter;
use crate::types::{QueryError, StorageError};

#[derive(Default)]
pub struct MemoryNewsStore {
    rows: Mutex<Vec<NewsItem>>,
    fail_inserts: bool,
    lookup_barrier: Option<Arc<Barrier>>,
    pub lookups: AtomicUsize,
}

impl MemoryNewsStore {
    pub fn failing_inserts() -> Self {
        Self { fail_inserts: true, ..Self::default() }
    }

    /// Every lookup waits on `barrier` after reading, so concurrent callers
    /// all observe the table before any of them inserts.
    pub fn with_lookup_barrier(barrier: Arc<Barrier>) -> Self {
        Self { lookup_barrier: Some(barrier), ..Self::default() }
    }

    pub fn rows(&self) -> Vec<NewsItem> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsRepository for MemoryNewsStore {
    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, QueryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let found = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.slug == slug)
            .map(|row| row.id);
        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn insert_news(&self, item: &NewsItem) -> Result<(), QueryError> {
        if self.fail_inserts {
            return Err(QueryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.slug == item.slug) {
            return Err(QueryError::UniqueViolation {
                constraint: "news_slug_key".to_string(),
            });
        }
        rows.push(item.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLogStore {
    rows: Mutex<Vec<LogEntry>>,
    fail: bool,
}

impl MemoryLogStore {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogRepository for MemoryLogStore {
    async fn insert_log(&self, entry: &NewLogEntry) -> Result<(), QueryError> {
        if self.fail {
            return Err(QueryError::Database(sqlx::Error::PoolClosed));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(LogEntry {
            id,
            level: entry.level.to_string(),
            message: entry.message.clone(),
            source: entry.source.clone(),
            created_at: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, QueryError> {
        if self.fail {
            return Err(QueryError::Database(sqlx::Error::PoolClosed));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
    fail: bool,
    pub put_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Upload {
                key: key.to_string(),
                reason: "bucket unavailable".to_string(),
            });
        }
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|o| o.key != key);
        objects.push(StoredObject {
            key: key.to_string(),
            bytes,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub news: Arc<MemoryNewsStore>,
    pub logs: Arc<MemoryLogStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_stores(MemoryNewsStore::default(), MemoryLogStore::default(), MemoryObjectStore::default())
    }

    pub fn with_stores(news: MemoryNewsStore, logs: MemoryLogStore, objects: MemoryObjectStore) -> Self {
        let news = Arc::new(news);
        let logs = Arc::new(logs);
        let objects = Arc::new(objects);
        let cdn = Url::parse("https://cdn.example.com").unwrap();
        let (request_log, _writer) = RequestLogSink::spawn(logs.clone(), 64);

        let state = AppState {
            submitter: NewsSubmitter::new(news.clone(), objects.clone(), cdn),
            logs: logs.clone(),
            request_log,
            max_upload_bytes: 1024 * 1024,
        };

        Self { state, news, logs, objects }
    }

    /// Wait until the background writer has handled `count` request logs.
    pub async fn wait_for_logs(&self, count: u64) {
        for _ in 0..200 {
            let stats = self.state.request_log.stats();
            if stats.written + stats.failed >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("request log writer did not catch up to {count} entries");
    }
}

/// A local TCP endpoint that accepts connections and never answers, for
/// exercising outbound timeouts.
pub async fn silent_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}
