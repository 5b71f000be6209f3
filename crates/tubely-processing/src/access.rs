//! Signed read access for stored videos.

use std::sync::Arc;
use std::time::Duration;
use tubely_core::models::{VideoLocator, VideoRecord, VideoResponse};
use tubely_storage::{Storage, StorageResult};

/// Turns stored locators into short-lived URLs at read time.
///
/// URLs are minted per request and never persisted.
#[derive(Clone)]
pub struct SignedAccessIssuer {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl SignedAccessIssuer {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `locator`. An absent or empty locator yields no URL.
    pub async fn issue(&self, locator: Option<&VideoLocator>) -> StorageResult<Option<String>> {
        let locator = match locator {
            Some(l) if !l.bucket.is_empty() && !l.key.is_empty() => l,
            _ => return Ok(None),
        };

        let url = self
            .storage
            .presign_get(&locator.bucket, &locator.key, self.ttl)
            .await?;
        Ok(Some(url))
    }

    /// Render `record` for a client with a freshly signed URL.
    pub async fn respond(&self, record: &VideoRecord) -> StorageResult<VideoResponse> {
        let url = self.issue(record.video_locator.as_ref()).await?;
        Ok(VideoResponse::from_record(record, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tubely_storage::{MemoryStorage, StorageError, UrlSigner};
    use uuid::Uuid;

    fn issuer() -> SignedAccessIssuer {
        let signer = UrlSigner::new("http://localhost:8091/media", b"issuer-secret").unwrap();
        SignedAccessIssuer::new(
            Arc::new(MemoryStorage::new("tubely", signer)),
            Duration::from_secs(900),
        )
    }

    fn record(locator: Option<VideoLocator>) -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "clip".to_string(),
            description: None,
            video_locator: locator,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_absent_locator_has_no_url() {
        let issuer = issuer();
        assert_eq!(issuer.issue(None).await.unwrap(), None);
        let empty = VideoLocator::new("", "");
        assert_eq!(issuer.issue(Some(&empty)).await.unwrap(), None);

        let response = issuer.respond(&record(None)).await.unwrap();
        assert!(response.video_url.is_none());
    }

    #[tokio::test]
    async fn test_url_is_bound_to_locator() {
        let issuer = issuer();
        let locator = VideoLocator::new("tubely", "landscape/abc.mp4");
        let url = issuer.issue(Some(&locator)).await.unwrap().unwrap();
        assert!(url.starts_with("http://localhost:8091/media/tubely/landscape/abc.mp4?token="));

        let response = issuer.respond(&record(Some(locator))).await.unwrap();
        assert!(response.video_url.is_some());
    }

    #[tokio::test]
    async fn test_signing_failure_surfaces() {
        let locator = VideoLocator::new("elsewhere", "landscape/abc.mp4");
        assert!(matches!(
            issuer().issue(Some(&locator)).await,
            Err(StorageError::UnknownBucket(_))
        ));
    }
}
