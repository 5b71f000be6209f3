use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tubely_core::models::VideoResponse;
use tubely_core::AppError;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 400, description = "Malformed video ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, record_id = %id, operation = "get_video")
)]
pub async fn get_video(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .repository
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    if !video.is_owned_by(auth.user_id) {
        return Err(AppError::Forbidden("You do not own this video".to_string()).into());
    }

    let response = state.access.respond(&video).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v0/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the caller, newest first", body = Vec<VideoResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, operation = "list_videos"))]
pub async fn list_videos(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.repository.list_videos_for_user(auth.user_id).await?;

    let mut responses = Vec::with_capacity(videos.len());
    for video in &videos {
        responses.push(state.access.respond(video).await?);
    }

    tracing::debug!(count = responses.len(), "Videos listed");
    Ok(Json(responses))
}
