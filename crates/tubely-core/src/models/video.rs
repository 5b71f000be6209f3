use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Where a video's bytes live in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLocator {
    pub bucket: String,
    pub key: String,
}

impl VideoLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Build a locator from nullable parts as stored by the metadata store.
    /// Any missing or empty part means no locator.
    pub fn from_parts(bucket: Option<String>, key: Option<String>) -> Option<Self> {
        match (bucket, key) {
            (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => {
                Some(Self { bucket, key })
            }
            _ => None,
        }
    }
}

impl Display for VideoLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A video as held by the metadata store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// `None` until media has been uploaded and committed.
    pub video_locator: Option<VideoLocator>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Point the record at newly uploaded media.
    pub fn with_locator(mut self, locator: VideoLocator) -> Self {
        self.video_locator = Some(locator);
        self.updated_at = Utc::now();
        self
    }
}

/// Input for creating a draft record.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Short-lived signed URL; absent when no media has been uploaded yet.
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_record(record: &VideoRecord, video_url: Option<String>) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title.clone(),
            description: record.description.clone(),
            video_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
