//! Serves objects of the local and memory backends behind signed URLs.

use crate::error::{media_access_error, ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::AppError;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct MediaQuery {
    /// Access token from the signed URL.
    pub token: Option<String>,
}

#[utoipa::path(
    get,
    path = "/media/{bucket}/{key}",
    tag = "media",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("key" = String, Path, description = "Object key, may contain '/'"),
        MediaQuery
    ),
    responses(
        (status = 200, description = "Object bytes", content_type = "video/mp4"),
        (status = 401, description = "No token supplied", body = ErrorResponse),
        (status = 403, description = "Token invalid, expired or for another object", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(bucket = %bucket, key = %key))]
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    ValidatedPath((bucket, key)): ValidatedPath<(String, String)>,
    Query(query): Query<MediaQuery>,
) -> Result<Response, HttpAppError> {
    let token = query
        .token
        .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string()))?;

    state
        .storage
        .verify_access(&bucket, &key, &token)
        .map_err(media_access_error)?;
    let object = state
        .storage
        .get(&bucket, &key)
        .await
        .map_err(media_access_error)?;

    tracing::debug!(size_bytes = object.data.len(), "Serving media object");

    let max_age = state.access.ttl().as_secs();
    Response::builder()
        .header(
            CONTENT_TYPE,
            object.content_type.as_deref().unwrap_or(VIDEO_CONTENT_TYPE),
        )
        .header(CONTENT_LENGTH, object.data.len())
        .header(CACHE_CONTROL, format!("private, max-age={}", max_age))
        .body(Body::from(object.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}
