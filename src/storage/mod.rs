// Object storage layer (S3-compatible)

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use url::Url;

use crate::models::ImageUpload;
use crate::types::StorageError;

pub mod s3_client;

pub use s3_client::*;

/// Write-only view of a key-addressed bucket. Overwrites are silent and the
/// caller owns the key policy.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;
}

/// Storage key for an uploaded image: `<slug>.<ext>`.
///
/// The extension comes from the uploaded file name, then from the declared
/// content type. With neither, the key is the bare slug.
pub fn image_key(slug: &str, upload: &ImageUpload) -> String {
    let from_name = Path::new(&upload.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase());

    let extension = from_name.or_else(|| content_type_extension(&upload.content_type));

    match extension {
        Some(ext) => format!("{slug}.{ext}"),
        None => slug.to_string(),
    }
}

/// Extension for a declared content type. The subtype wins when it is a known
/// extension (`image/jpeg` gives `jpeg`, not `jfif`).
fn content_type_extension(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.parse().ok()?;
    let known = mime_guess::get_mime_extensions(&mime)?;
    let subtype = mime.subtype().as_str();

    known
        .iter()
        .find(|ext| ext.eq_ignore_ascii_case(subtype))
        .or_else(|| known.first())
        .map(|ext| ext.to_string())
}

/// Public URL for `key` under the CDN base. The key is percent-encoded as a
/// single path segment.
pub fn image_url(cdn_base: &Url, key: &str) -> String {
    let mut url = cdn_base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(key);
    }
    url.to_string()
}
