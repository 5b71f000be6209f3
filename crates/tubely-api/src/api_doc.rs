//! OpenAPI documentation.

use crate::error;
use crate::handlers;
use tubely_core::models;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video ingestion API (v0). Uploaded MP4 files are probed, classified by aspect ratio, remuxed for fast start and stored; reads return short-lived signed URLs."
    ),
    paths(
        handlers::video_create::create_video,
        handlers::video_get::get_video,
        handlers::video_get::list_videos,
        handlers::video_upload::upload_video,
        handlers::media_file::serve_media,
        handlers::health::health_check,
        handlers::health::liveness_check,
    ),
    components(
        schemas(
            models::VideoResponse,
            models::AspectClass,
            handlers::video_create::CreateVideoRequest,
            handlers::video_upload::UploadVideoForm,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "videos", description = "Video records and uploads"),
        (name = "media", description = "Signed object access"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;
