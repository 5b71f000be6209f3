//! API constants

/// Versioned prefix of every authenticated route.
pub const API_PREFIX: &str = "/api/v0";

/// Prefix of the route that serves objects behind signed URLs.
pub const MEDIA_ROUTE_PREFIX: &str = "/media";

/// Allowance on top of the upload ceiling for multipart boundaries and part
/// headers. The ingestion pipeline enforces the exact ceiling on file bytes.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Requests served concurrently before new ones wait.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Upper bound on each dependency probe of the health endpoint.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
