use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart form accepted by the upload route.
#[allow(dead_code)] // Schema only; the body is streamed, never deserialized.
#[derive(ToSchema)]
pub struct UploadVideoForm {
    /// MP4 file sent with content type `video/mp4`.
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/v0/videos/{id}/upload",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = UploadVideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video ingested", body = VideoResponse),
        (status = 400, description = "Missing, empty or malformed upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Upload is not video/mp4", body = ErrorResponse),
        (status = 500, description = "Processing, storage or metadata failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %auth.user_id, record_id = %id, operation = "upload_video")
)]
pub async fn upload_video(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    // Ownership first: a rejected caller's bytes are never staged.
    let record = state.orchestrator.authorize(id, auth.user_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unexpected form field");
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let body = StreamReader::new(Box::pin(field.map_err(io::Error::other)));

        let outcome = state
            .orchestrator
            .ingest_authorized(record, content_type.as_deref(), body)
            .await?;

        let response = state.access.respond(&outcome.record).await?;
        return Ok(Json(response));
    }

    Err(AppError::InvalidInput(format!(
        "Multipart field '{}' is required",
        VIDEO_FORM_FIELD
    ))
    .into())
}
