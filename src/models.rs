use std::sync::Arc;

use bytes::Bytes;
use validator::Validate;

use crate::db::LogRepository;
use crate::middleware::RequestLogSink;
use crate::submission::NewsSubmitter;
use crate::types::LogLevel;

#[derive(Clone)]
pub struct AppState {
    pub submitter: NewsSubmitter,
    pub logs: Arc<dyn LogRepository>,
    pub request_log: RequestLogSink,
    pub max_upload_bytes: usize,
}

// Rows
// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct NewsItem {
    pub id: uuid::Uuid,
    pub slug: String,
    pub image: Option<String>,
    pub title: String,
    pub source_url: String,
    pub description: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub level: String,
    pub message: String,
    pub source: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A log row waiting to be written. `created_at` is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub level: LogLevel,
    pub message: String,
    pub source: String,
}

impl NewLogEntry {
    /// Entry describing one inbound HTTP request.
    pub fn for_request(method: &str, path: &str, client_ip: &str) -> Self {
        Self {
            level: LogLevel::Info,
            message: format!("{method} {path} from {client_ip}"),
            source: format!("http-ip {client_ip}"),
        }
    }
}

// Form payloads

/// Image file taken from the `image` multipart field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct Submission {
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "source_url is required"))]
    pub source_url: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub image: Option<ImageUpload>,
}
