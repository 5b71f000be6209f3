//! Multipart upload helpers.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use std::io;
use tubely_core::AppError;

/// Map a multipart framing or body error to the error the client gets.
///
/// Hitting the request body limit is a 413; anything else the client sent is
/// a 400.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Whether a body read error wraps a multipart error caused by the request
/// body limit.
pub fn is_payload_too_large(err: &io::Error) -> bool {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .map(|inner| inner.status() == StatusCode::PAYLOAD_TOO_LARGE)
        .unwrap_or(false)
}
