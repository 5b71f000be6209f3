use super::VideoRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::models::{NewVideo, VideoRecord};
use tubely_core::AppError;
use uuid::Uuid;

/// Process-lifetime metadata store.
///
/// Cloning shares the underlying map, so every handle sees the same records.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, replacing any record with the same id.
    pub async fn insert(&self, video: VideoRecord) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        let now = Utc::now();
        let record = VideoRecord {
            id: Uuid::new_v4(),
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_locator: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let mut videos: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(existing.clone())
            }
            None => Err(AppError::NotFound(format!("Video {} not found", video.id))),
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
