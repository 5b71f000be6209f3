//! Video ingestion: upload bytes in, committed object and record out.
//!
//! One [`IngestionOrchestrator::ingest`] call walks a single upload through
//! `Received -> Staged -> Probed -> Remuxed -> Uploaded -> Committed`. Any step
//! may end it in `Failed(reason)`. The ownership check runs before anything is
//! written anywhere, and every scratch file is removed on every exit path,
//! including the caller dropping the future.
//!
//! There are no retries here. A metadata failure after a successful upload
//! leaves the object in the store and logs its locator for reconciliation.

use crate::aspect::classify;
use crate::keys::{KeyError, ObjectKey};
use crate::probe::{MediaProber, ProbeError};
use crate::remux::{remuxed_path_for, RemuxError, StreamRemuxer};
use crate::staging::{ScratchFile, StagingArea};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::models::{AspectClass, MediaGeometry, VideoLocator, VideoRecord};
use tubely_core::AppError;
use tubely_db::VideoRepository;
use tubely_storage::{Storage, StorageError};
use uuid::Uuid;

const STAGING_CHUNK_BYTES: usize = 64 * 1024;

/// Why an ingestion ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Validation,
    Unauthorized,
    NotFound,
    Processing,
    Storage,
    Metadata,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Staged,
    Probed,
    Remuxed,
    Uploaded,
    Committed,
    Failed(FailureReason),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("User {user_id} does not own video {record_id}")]
    NotOwner { record_id: Uuid, user_id: Uuid },

    #[error("Unsupported media type {}, expected {}", .0.as_deref().unwrap_or("(none)"), VIDEO_CONTENT_TYPE)]
    UnsupportedMediaType(Option<String>),

    #[error("Uploaded video is empty")]
    EmptyUpload,

    #[error("Uploaded video exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Failed to read upload body: {0}")]
    BodyRead(#[source] io::Error),

    #[error("Failed to stage upload: {0}")]
    Staging(#[source] io::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Remux(#[from] RemuxError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Failed to store video: {0}")]
    Upload(#[source] StorageError),

    #[error("Failed to load video: {0}")]
    Lookup(#[source] AppError),

    #[error("Failed to record upload {locator}: {source}")]
    Commit {
        locator: VideoLocator,
        #[source]
        source: AppError,
    },
}

impl IngestError {
    pub fn reason(&self) -> FailureReason {
        match self {
            IngestError::NotFound(_) => FailureReason::NotFound,
            IngestError::NotOwner { .. } => FailureReason::Unauthorized,
            IngestError::UnsupportedMediaType(_)
            | IngestError::EmptyUpload
            | IngestError::TooLarge { .. }
            | IngestError::BodyRead(_) => FailureReason::Validation,
            IngestError::Probe(_) | IngestError::Remux(_) => FailureReason::Processing,
            IngestError::Upload(_) => FailureReason::Storage,
            IngestError::Lookup(_) | IngestError::Commit { .. } => FailureReason::Metadata,
            IngestError::Staging(_) | IngestError::Key(_) => FailureReason::Internal,
        }
    }
}

/// One upload as it arrives from the caller.
pub struct UploadRequest<R> {
    pub record_id: Uuid,
    pub principal_id: Uuid,
    pub content_type: Option<String>,
    pub body: R,
}

/// Result of a committed ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub record: VideoRecord,
    pub key: ObjectKey,
    pub aspect: AspectClass,
    pub geometry: MediaGeometry,
    /// Size of the stored (remuxed) object.
    pub size_bytes: u64,
    pub state: IngestState,
}

/// `true` for `video/mp4`, ignoring case and parameters.
pub fn is_accepted_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(VIDEO_CONTENT_TYPE))
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct IngestionOrchestrator {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn StreamRemuxer>,
    staging: StagingArea,
    max_upload_bytes: u64,
}

impl IngestionOrchestrator {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn MediaProber>,
        remuxer: Arc<dyn StreamRemuxer>,
        staging: StagingArea,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            repository,
            storage,
            prober,
            remuxer,
            staging,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Authorize and ingest in one call.
    pub async fn ingest<R>(&self, request: UploadRequest<R>) -> Result<IngestOutcome, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let record = self
            .authorize(request.record_id, request.principal_id)
            .await?;
        self.ingest_authorized(record, request.content_type.as_deref(), request.body)
            .await
    }

    /// Load the target record and check that `principal_id` owns it.
    ///
    /// Read-only: nothing is staged, spawned or written.
    #[tracing::instrument(skip(self), fields(record_id = %record_id, user_id = %principal_id))]
    pub async fn authorize(
        &self,
        record_id: Uuid,
        principal_id: Uuid,
    ) -> Result<VideoRecord, IngestError> {
        let record = self
            .repository
            .get_video(record_id)
            .await
            .map_err(IngestError::Lookup)?
            .ok_or(IngestError::NotFound(record_id))?;

        if !record.is_owned_by(principal_id) {
            tracing::warn!("Upload rejected: caller does not own the video");
            return Err(IngestError::NotOwner {
                record_id,
                user_id: principal_id,
            });
        }

        Ok(record)
    }

    /// Ingest `body` into a record already returned by [`Self::authorize`].
    #[tracing::instrument(skip(self, record, body), fields(record_id = %record.id, user_id = %record.user_id))]
    pub async fn ingest_authorized<R>(
        &self,
        record: VideoRecord,
        content_type: Option<&str>,
        body: R,
    ) -> Result<IngestOutcome, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        let mut state = IngestState::Received;
        let mut scratch: Vec<ScratchFile> = Vec::with_capacity(2);

        let result = self
            .run(record, content_type, body, &mut state, &mut scratch)
            .await;

        for file in scratch.iter_mut() {
            file.release().await;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => tracing::info!(
                key = %outcome.key,
                aspect = %outcome.aspect,
                width = outcome.geometry.width(),
                height = outcome.geometry.height(),
                size_bytes = outcome.size_bytes,
                duration_ms = duration_ms,
                "Video ingested"
            ),
            Err(e) => tracing::warn!(
                state = ?IngestState::Failed(e.reason()),
                last_state = ?state,
                error = %e,
                duration_ms = duration_ms,
                "Video ingestion failed"
            ),
        }

        result
    }

    async fn run<R>(
        &self,
        record: VideoRecord,
        content_type: Option<&str>,
        mut body: R,
        state: &mut IngestState,
        scratch: &mut Vec<ScratchFile>,
    ) -> Result<IngestOutcome, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        match content_type {
            Some(ct) if is_accepted_content_type(ct) => {}
            other => {
                return Err(IngestError::UnsupportedMediaType(
                    other.map(String::from),
                ))
            }
        }

        let (mut file, staged) = self.staging.create().await.map_err(IngestError::Staging)?;
        let staged_path = match staged.path() {
            Some(path) => path.to_path_buf(),
            None => {
                return Err(IngestError::Staging(io::Error::other(
                    "staged file has no path",
                )))
            }
        };
        scratch.push(staged);
        let uploaded_bytes = self.stage_body(&mut body, &mut file).await?;
        drop(file);
        advance(state, IngestState::Staged);
        tracing::debug!(
            path = %staged_path.display(),
            size_bytes = uploaded_bytes,
            "Upload staged"
        );

        let geometry = self.prober.probe(&staged_path).await?;
        advance(state, IngestState::Probed);

        let expected_output = remuxed_path_for(&staged_path);
        scratch.push(ScratchFile::adopt(&expected_output));
        let remuxed_path = self.remuxer.remux(&staged_path).await?;
        if remuxed_path != expected_output {
            scratch.push(ScratchFile::adopt(&remuxed_path));
        }
        advance(state, IngestState::Remuxed);

        let aspect = classify(geometry);
        let key = ObjectKey::generate(aspect)?;
        let bucket = self.storage.bucket().to_string();
        let object_key = key.to_string();

        let remuxed = tokio::fs::File::open(&remuxed_path)
            .await
            .map_err(IngestError::Staging)?;
        let size_bytes = self
            .storage
            .put_stream(&bucket, &object_key, VIDEO_CONTENT_TYPE, Box::pin(remuxed))
            .await
            .map_err(IngestError::Upload)?;
        advance(state, IngestState::Uploaded);

        let locator = VideoLocator::new(bucket, object_key);
        let updated = record.with_locator(locator.clone());
        let record = match self.repository.update_video(&updated).await {
            Ok(record) => record,
            Err(source) => {
                tracing::error!(
                    bucket = %locator.bucket,
                    key = %locator.key,
                    record_id = %updated.id,
                    error = %source,
                    "Stored object is orphaned: metadata update failed"
                );
                return Err(IngestError::Commit { locator, source });
            }
        };
        advance(state, IngestState::Committed);

        Ok(IngestOutcome {
            record,
            key,
            aspect,
            geometry,
            size_bytes,
            state: *state,
        })
    }

    /// Copy `body` into `file`, refusing anything past the upload ceiling.
    async fn stage_body<R>(
        &self,
        body: &mut R,
        file: &mut tokio::fs::File,
    ) -> Result<u64, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buffer = vec![0u8; STAGING_CHUNK_BYTES];
        let mut written: u64 = 0;

        loop {
            let n = body.read(&mut buffer).await.map_err(IngestError::BodyRead)?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > self.max_upload_bytes {
                return Err(IngestError::TooLarge {
                    limit: self.max_upload_bytes,
                });
            }
            file.write_all(&buffer[..n])
                .await
                .map_err(IngestError::Staging)?;
        }
        file.flush().await.map_err(IngestError::Staging)?;

        if written == 0 {
            return Err(IngestError::EmptyUpload);
        }
        Ok(written)
    }
}

fn advance(state: &mut IngestState, next: IngestState) {
    tracing::debug!(from = ?*state, to = ?next, "Ingestion state transition");
    *state = next;
}
