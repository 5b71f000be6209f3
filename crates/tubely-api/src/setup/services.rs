//! Wiring of repositories, the ingestion pipeline and auth into `AppState`.

use crate::auth::JwtService;
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{create_video_repository, VideoRepository};
use tubely_processing::{
    FfmpegRemuxer, FfprobeProber, IngestionOrchestrator, MediaProber, SignedAccessIssuer,
    StagingArea, StreamRemuxer,
};
use tubely_storage::Storage;

/// Build the production state: repository per `METADATA_BACKEND`, ffprobe and
/// ffmpeg from the configured paths.
pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let repository =
        create_video_repository(config, pool).context("Failed to create video repository")?;

    let prober = Arc::new(FfprobeProber::new(
        config.ffprobe_path(),
        config.media_tool_timeout(),
    ));
    let remuxer = Arc::new(FfmpegRemuxer::new(
        config.ffmpeg_path(),
        config.media_tool_timeout(),
    ));

    tracing::info!(
        ffprobe_path = %config.ffprobe_path(),
        ffmpeg_path = %config.ffmpeg_path(),
        staging_dir = %config.staging_dir().display(),
        "Media tooling configured"
    );

    Ok(build_state(config, repository, storage, prober, remuxer))
}

/// Assemble `AppState` from already constructed capabilities.
pub fn build_state(
    config: &Config,
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn StreamRemuxer>,
) -> Arc<AppState> {
    let orchestrator = IngestionOrchestrator::new(
        repository.clone(),
        storage.clone(),
        prober,
        remuxer,
        StagingArea::new(config.staging_dir()),
        config.max_video_size_bytes(),
    );
    let access = SignedAccessIssuer::new(storage.clone(), config.signed_url_ttl());

    Arc::new(AppState {
        config: config.clone(),
        repository,
        storage,
        orchestrator,
        access,
        jwt: JwtService::new(config.jwt_secret()),
    })
}
