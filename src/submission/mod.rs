//! News submission workflow
//!
//! Order of effects for one submission:
//! 1. validate the four text fields
//! 2. upload the image, if any, under `<slug>.<ext>`
//! 3. reject slugs that already exist
//! 4. insert the row
//!
//! An upload failure stops the workflow before the database is touched. A
//! database failure after a successful upload leaves the object in the bucket;
//! its key is logged so it can be cleaned up by hand.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;
use uuid::Uuid;
use validator::Validate;

use crate::db::NewsRepository;
use crate::models::{NewsItem, Submission};
use crate::storage::{image_key, image_url, ObjectStore};
use crate::types::{QueryError, SubmissionError, SubmissionResult};

#[derive(Clone)]
pub struct NewsSubmitter {
    news: Arc<dyn NewsRepository>,
    objects: Arc<dyn ObjectStore>,
    cdn_base: Url,
}

impl NewsSubmitter {
    pub fn new(news: Arc<dyn NewsRepository>, objects: Arc<dyn ObjectStore>, cdn_base: Url) -> Self {
        Self { news, objects, cdn_base }
    }

    pub async fn submit(&self, submission: Submission) -> SubmissionResult<NewsItem> {
        submission
            .validate()
            .map_err(|e| SubmissionError::Invalid(e.to_string()))?;

        let Submission {
            slug,
            title,
            source_url,
            description,
            image,
        } = submission;

        let mut uploaded_key = None;
        let image = match image {
            Some(upload) => {
                let key = image_key(&slug, &upload);
                self.objects
                    .put(&key, upload.bytes, &upload.content_type)
                    .await?;
                let url = image_url(&self.cdn_base, &key);
                uploaded_key = Some(key);
                Some(url)
            }
            None => None,
        };

        let item = NewsItem {
            id: Uuid::new_v4(),
            slug,
            image,
            title,
            source_url,
            description,
        };

        if let Err(err) = self.store(&item).await {
            if let Some(key) = uploaded_key {
                warn!(key = %key, slug = %item.slug, "Image uploaded but news row not written; object is orphaned");
            }
            return Err(err);
        }

        info!(id = %item.id, slug = %item.slug, has_image = item.image.is_some(), "News item stored");
        Ok(item)
    }

    async fn store(&self, item: &NewsItem) -> SubmissionResult<()> {
        let existing = self
            .news
            .find_id_by_slug(&item.slug)
            .await
            .map_err(SubmissionError::Query)?;
        if existing.is_some() {
            return Err(SubmissionError::DuplicateSlug(item.slug.clone()));
        }

        // The unique index settles races the lookup above cannot see.
        match self.news.insert_news(item).await {
            Ok(()) => Ok(()),
            Err(QueryError::UniqueViolation { .. }) => {
                Err(SubmissionError::DuplicateSlug(item.slug.clone()))
            }
            Err(e) => Err(SubmissionError::Query(e)),
        }
    }
}
