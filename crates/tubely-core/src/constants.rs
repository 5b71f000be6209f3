//! Constants shared across crates.

use std::time::Duration;

/// The only container type accepted for video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Multipart form field carrying the video file.
pub const VIDEO_FORM_FIELD: &str = "video";

/// File extension of stored video objects.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Random bytes drawn for each object key's base name.
pub const OBJECT_KEY_RANDOM_BYTES: usize = 32;

/// Validity of signed access URLs.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Default upload ceiling (1 GiB).
///
/// Storing a remuxed file buffers it whole, so each in-flight upload can hold
/// up to this many bytes of memory.
pub const DEFAULT_MAX_VIDEO_SIZE_BYTES: u64 = 1 << 30;

/// Prefix of staged upload files.
pub const STAGED_FILE_PREFIX: &str = "tubely-upload-";

/// Suffix appended to a staged path to name its remuxed output.
pub const REMUXED_FILE_SUFFIX: &str = ".processing";
