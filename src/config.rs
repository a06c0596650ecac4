use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub request_log: RequestLogConfig,
    /// Upper bound, in seconds, on every outbound S3 or SQL call.
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
    pub cdn_url: Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestLogConfig {
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let s3_endpoint = match (lookup("S3_ENDPOINT"), lookup("R2_ACCOUNT_ID")) {
            (Some(endpoint), _) if !endpoint.trim().is_empty() => endpoint,
            (_, Some(account)) if !account.trim().is_empty() => {
                format!("https://{}.r2.cloudflarestorage.com", account.trim())
            }
            _ => return Err(anyhow!("either S3_ENDPOINT or R2_ACCOUNT_ID must be set")),
        };

        let cdn_raw = required("CDN_URL")?;
        let cdn_url = Url::parse(&cdn_raw).with_context(|| format!("CDN_URL is not a valid URL: {cdn_raw}"))?;
        if cdn_url.cannot_be_a_base() || !matches!(cdn_url.scheme(), "http" | "https") {
            return Err(anyhow!("CDN_URL must be an http(s) URL, got {cdn_raw}"));
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&lookup, "PORT", 3000)?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
            },
            storage: StorageConfig {
                s3_bucket: required("R2_BUCKET")?,
                s3_region: lookup("S3_REGION").unwrap_or_else(|| "auto".to_string()),
                s3_endpoint,
                s3_access_key_id: required("R2_ACCESS_KEY_ID")?,
                s3_secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
                cdn_url,
            },
            request_log: RequestLogConfig {
                queue_capacity: parse_or(&lookup, "REQUEST_LOG_QUEUE", 1024)?,
            },
            upstream_timeout_secs: parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
