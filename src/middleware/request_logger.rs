//! Request logging
//!
//! Every inbound request is turned into one `logs` row. The middleware only
//! enqueues the row; a single writer task drains the queue into the database.
//! Failed or dropped writes are counted and reported through `tracing`, never
//! through the HTTP response.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
    RequestExt,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::db::LogRepository;
use crate::models::NewLogEntry;

#[derive(Default)]
struct Counters {
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time view of the writer's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub written: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Sending half of the request-log queue. Cheap to clone.
#[derive(Clone)]
pub struct RequestLogSink {
    tx: mpsc::Sender<NewLogEntry>,
    counters: Arc<Counters>,
}

impl RequestLogSink {
    /// Start the writer task. It runs until every sink clone is dropped and
    /// the queue is empty.
    pub fn spawn(store: Arc<dyn LogRepository>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<NewLogEntry>(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let writer_counters = counters.clone();
        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                match store.insert_log(&entry).await {
                    Ok(()) => {
                        writer_counters.written.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        writer_counters.failed.fetch_add(1, Ordering::Relaxed);
                        error!(error = %e, message = %entry.message, "Failed to insert log");
                    }
                }
            }
        });

        (Self { tx, counters }, handle)
    }

    /// Queue an entry without waiting. A full or closed queue drops it.
    pub fn record(&self, entry: NewLogEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(message = %entry.message, "Request log queue full, entry dropped");
            }
            Err(TrySendError::Closed(entry)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(message = %entry.message, "Request log writer stopped, entry dropped");
            }
        }
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Axum middleware: log `<METHOD> <PATH> from <IP>` and continue immediately.
pub async fn log_request(State(sink): State<RequestLogSink>, mut req: Request, next: Next) -> Response {
    let client_ip = req
        .extract_parts::<ConnectInfo<SocketAddr>>()
        .await
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.uri().path());

    sink.record(NewLogEntry::for_request(req.method().as_str(), path, &client_ip));

    next.run(req).await
}
