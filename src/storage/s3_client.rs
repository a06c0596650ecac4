// S3 client backed by rust-s3; works against R2 and other S3-compatible endpoints

use async_trait::async_trait;
use bytes::Bytes;
use s3::{creds::Credentials, Bucket, Region};
use std::time::Duration;
use tracing::debug;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::types::StorageError;

pub struct S3ObjectStore {
    bucket: Bucket,
    timeout: Duration,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.s3_region.clone(),
            endpoint: config.s3_endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(config.s3_access_key_id.as_str()),
            Some(config.s3_secret_access_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(&config.s3_bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket, timeout })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let upload = self
            .bucket
            .put_object_with_content_type(key, &bytes, content_type);

        let response = match tokio::time::timeout(self.timeout, upload).await {
            Ok(result) => result.map_err(|e| StorageError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                return Err(StorageError::Timeout {
                    key: key.to_string(),
                    after: self.timeout,
                })
            }
        };

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                reason: format!("object store answered with status {status}"),
            });
        }

        debug!(key, size = bytes.len(), content_type, "Object stored");
        Ok(())
    }
}
