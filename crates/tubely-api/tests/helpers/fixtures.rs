//! Test fixtures: minimal MP4 bytes and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use tubely_core::constants::{VIDEO_CONTENT_TYPE, VIDEO_FORM_FIELD};

/// Minimal MP4-shaped bytes (ftyp box followed by an mdat box).
pub fn create_test_video() -> Vec<u8> {
    let mut video = Vec::new();
    video.extend_from_slice(&[0x00, 0x00, 0x00, 0x18]);
    video.extend_from_slice(b"ftypisom");
    video.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    video.extend_from_slice(b"isomiso2");
    video.extend_from_slice(&[0x00, 0x00, 0x00, 0x10]);
    video.extend_from_slice(b"mdat");
    video.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03]);
    video
}

/// Form with the video under the expected field name.
pub fn video_form(data: Vec<u8>) -> MultipartForm {
    video_form_with_type(data, VIDEO_CONTENT_TYPE)
}

pub fn video_form_with_type(data: Vec<u8>, content_type: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name("clip.mp4")
        .mime_type(content_type);
    MultipartForm::new().add_part(VIDEO_FORM_FIELD, part)
}
