//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs against the in-memory metadata and object stores, with
//! stand-ins for ffprobe and ffmpeg, so no external services are needed.
//! Run from workspace root: `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;
pub mod storage;

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::constants;
use tubely_api::setup::{routes, services};
use tubely_api::state::AppState;
use tubely_core::models::{MediaGeometry, NewVideo, VideoRecord};
use tubely_core::{
    AppError, BaseConfig, Config, LogFormat, MetadataBackend, ServiceConfig, StorageBackend,
};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{remuxed_path_for, MediaProber, ProbeError, RemuxError, StreamRemuxer};
use tubely_storage::{MemoryStorage, UrlSigner};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-32-plus-chars";
pub const TEST_MEDIA_BASE_URL: &str = "http://localhost:8091/media";
pub const TEST_BUCKET: &str = "tubely";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Knobs for the pieces the tests swap out.
pub struct TestOptions {
    /// Geometry reported by the prober; `None` means "no video stream".
    pub geometry: Option<MediaGeometry>,
    pub remux_fails: bool,
    pub commit_fails: bool,
    pub max_video_size_bytes: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            geometry: MediaGeometry::new(1920, 1080),
            remux_fails: false,
            commit_fails: false,
            max_video_size_bytes: 1024 * 1024,
        }
    }
}

/// Test application: server plus the resources the assertions inspect.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: storage::RecordingStorage,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently left in the staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.staging_dir.path()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Insert a draft record directly, bypassing the API.
    pub async fn create_record(&self, user_id: Uuid, title: &str) -> VideoRecord {
        self.state
            .repository
            .create_video(NewVideo {
                user_id,
                title: title.to_string(),
                description: None,
            })
            .await
            .expect("Failed to create record")
    }
}

pub fn test_config(staging_dir: &Path, max_video_size_bytes: u64) -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
            log_format: LogFormat::Compact,
        },
        metadata_backend: MetadataBackend::Memory,
        database_url: None,
        storage_backend: StorageBackend::Memory,
        s3_bucket: Some(TEST_BUCKET.to_string()),
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: None,
        media_base_url: Some(TEST_MEDIA_BASE_URL.to_string()),
        media_signing_secret: Some("media-signing-secret".to_string()),
        signed_url_ttl_secs: 900,
        max_video_size_bytes,
        staging_dir: Some(staging_dir.to_string_lossy().to_string()),
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        media_tool_timeout_secs: 10,
    }))
}

/// Setup test app with default options.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
    let config = test_config(staging_dir.path(), options.max_video_size_bytes);
    config.validate().expect("Test config should be valid");

    let signer = UrlSigner::new(TEST_MEDIA_BASE_URL, b"media-signing-secret")
        .expect("Failed to create signer");
    let storage = storage::RecordingStorage::new(MemoryStorage::new(TEST_BUCKET, signer));

    let repository = Arc::new(FlakyRepository {
        inner: InMemoryVideoRepository::new(),
        commit_fails: options.commit_fails,
    });

    let state = services::build_state(
        &config,
        repository,
        Arc::new(storage.clone()),
        Arc::new(FixedProber(options.geometry)),
        Arc::new(CopyRemuxer {
            fails: options.remux_fails,
        }),
    );

    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
        staging_dir,
    }
}

/// Reports a fixed geometry for every file.
struct FixedProber(Option<MediaGeometry>);

#[async_trait]
impl MediaProber for FixedProber {
    async fn probe(&self, _path: &Path) -> Result<MediaGeometry, ProbeError> {
        self.0.ok_or(ProbeError::NoVideoStream)
    }
}

/// Copies the input to the remux output path, or fails after a partial write.
struct CopyRemuxer {
    fails: bool,
}

#[async_trait]
impl StreamRemuxer for CopyRemuxer {
    async fn remux(&self, input: &Path) -> Result<PathBuf, RemuxError> {
        let output = remuxed_path_for(input);
        if self.fails {
            tokio::fs::write(&output, b"partial").await.ok();
            return Err(RemuxError::ToolFailure {
                message: "ffmpeg exited with status 1".to_string(),
                stderr: "moov atom not found".to_string(),
            });
        }
        tokio::fs::copy(input, &output)
            .await
            .map_err(|e| RemuxError::ToolFailure {
                message: e.to_string(),
                stderr: String::new(),
            })?;
        Ok(output)
    }
}

/// In-memory repository whose updates can be made to fail.
struct FlakyRepository {
    inner: InMemoryVideoRepository,
    commit_fails: bool,
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn create_video(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        self.inner.create_video(video).await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.inner.get_video(id).await
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        self.inner.list_videos_for_user(user_id).await
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        if self.commit_fails {
            return Err(AppError::Metadata("connection reset by peer".to_string()));
        }
        self.inner.update_video(video).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.inner.health_check().await
    }
}
