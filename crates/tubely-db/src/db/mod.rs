//! Database repositories for data access layer
//!
//! `VideoRepository` is the seam the ingestion pipeline and handlers depend
//! on. `PostgresVideoRepository` persists records with sqlx;
//! `InMemoryVideoRepository` keeps them for the lifetime of the process.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoRepository;
pub use video::PostgresVideoRepository;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::models::{NewVideo, VideoRecord};
use tubely_core::{AppError, Config, MetadataBackend};
use uuid::Uuid;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a draft record with no media attached.
    async fn create_video(&self, video: NewVideo) -> Result<VideoRecord, AppError>;

    /// Fetch a record by id; `Ok(None)` when it does not exist.
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError>;

    /// Persist every mutable field of `video`. Fails with `NotFound` if the
    /// record has disappeared.
    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError>;

    /// Cheap reachability check used by the health endpoint.
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Build the repository selected by `METADATA_BACKEND`.
///
/// `pool` is required for the Postgres backend and ignored otherwise.
pub fn create_video_repository(
    config: &Config,
    pool: Option<PgPool>,
) -> Result<Arc<dyn VideoRepository>, AppError> {
    match config.metadata_backend() {
        MetadataBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::Internal("Postgres metadata backend requires a pool".to_string())
            })?;
            Ok(Arc::new(PostgresVideoRepository::new(pool)))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; records are lost on restart");
            Ok(Arc::new(InMemoryVideoRepository::new()))
        }
    }
}
