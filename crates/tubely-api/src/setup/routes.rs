//! Route configuration and setup.

use crate::api_doc;
use crate::auth::middleware::auth_middleware;
use crate::constants::{
    API_PREFIX, HTTP_CONCURRENCY_LIMIT, MEDIA_ROUTE_PREFIX, MULTIPART_OVERHEAD_BYTES,
};
use crate::handlers::{health, media_file, video_create, video_get, video_upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tubely_core::Config;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let body_limit = request_body_limit(config.max_video_size_bytes());
    tracing::info!(body_limit_bytes = body_limit, "Request body limit layer enabled");

    let app = public_routes()
        .merge(protected_routes)
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// The upload ceiling plus multipart framing, saturating on small targets.
fn request_body_limit(max_video_size_bytes: u64) -> usize {
    usize::try_from(max_video_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(
            &format!("{}/{{bucket}}/{{*key}}", MEDIA_ROUTE_PREFIX),
            get(media_file::serve_media),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::get_openapi_spec()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(video_create::create_video).get(video_get::list_videos),
        )
        .route(
            &format!("{}/videos/{{id}}", API_PREFIX),
            get(video_get::get_video),
        )
        .route(
            &format!("{}/videos/{{id}}/upload", API_PREFIX),
            post(video_upload::upload_video),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_adds_multipart_overhead() {
        assert_eq!(request_body_limit(1024), 1024 + 1024 * 1024);
        assert_eq!(request_body_limit(u64::MAX), usize::MAX);
    }
}
