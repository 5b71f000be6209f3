use super::VideoRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use tubely_core::models::{NewVideo, VideoLocator, VideoRecord};
use tubely_core::AppError;
use uuid::Uuid;

/// Row shape of the `videos` table. The locator is split over two nullable
/// columns constrained to be set together.
#[derive(Debug, FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    video_bucket: Option<String>,
    video_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for VideoRecord {
    fn from(row: VideoRow) -> Self {
        VideoRecord {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            video_locator: VideoLocator::from_parts(row.video_bucket, row.video_key),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, video_bucket, video_key, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PostgresVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", user_id = %video.user_id))]
    async fn create_video(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        let row: VideoRow = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "INSERT INTO videos (id, user_id, title, description) VALUES ($1, $2, $3, $4) RETURNING {}",
            VIDEO_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let rows: Vec<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", video_id = %video.id))]
    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let (bucket, key) = match &video.video_locator {
            Some(locator) => (Some(locator.bucket.as_str()), Some(locator.key.as_str())),
            None => (None, None),
        };

        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(&format!(
            "UPDATE videos SET title = $2, description = $3, video_bucket = $4, video_key = $5, updated_at = $6 WHERE id = $1 RETURNING {}",
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(bucket)
        .bind(key)
        .bind(video.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
