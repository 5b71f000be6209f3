use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::models::{NewVideo, VideoResponse};
use tubely_core::AppError;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Draft video created", body = VideoResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %auth.user_id, operation = "create_video")
)]
pub async fn create_video(
    auth: AuthContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title must not be blank".to_string()).into());
    }

    let record = state
        .repository
        .create_video(NewVideo {
            user_id: auth.user_id,
            title: title.to_string(),
            description: request.description,
        })
        .await?;

    tracing::info!(record_id = %record.id, "Draft video created");

    let response = state.access.respond(&record).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
