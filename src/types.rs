// Error types shared across the storage, database and submission layers

use std::fmt;
use std::time::Duration;

/// Severity tag stored in `logs.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("Upload of {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },

    #[error("Object store misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A unique index rejected the statement.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Database call timed out after {after:?}")]
    Timeout { after: Duration },
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => QueryError::UniqueViolation {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            },
            _ => QueryError::Database(err),
        }
    }
}

/// Everything that can stop a news submission. Rendered to the caller as a
/// single message string.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid submission: {0}")]
    Invalid(String),

    #[error("Malformed form data: {0}")]
    InvalidForm(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Query(QueryError),

    #[error("Slug already exists. Please choose a different one.")]
    DuplicateSlug(String),
}

pub type SubmissionResult<T> = std::result::Result<T, SubmissionError>;
