//! Tubely Storage Library
//!
//! The object store capability used by the ingestion pipeline and the read
//! path: a `Storage` trait plus S3, local filesystem and in-process memory
//! backends.
//!
//! # Object addressing
//!
//! Objects are addressed by `(bucket, key)`. A backend instance serves exactly
//! one bucket and rejects locators naming any other. Keys must not contain
//! `..`, a leading `/`, or be empty (see the `keys` module).
//!
//! # Signed URLs
//!
//! S3 URLs are presigned by S3 itself. Local and memory backends mint
//! HMAC-SHA256 tokens (see `signing`) that the API verifies before serving
//! bytes from its `/media` route.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::UrlSigner;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
pub use tubely_core::StorageBackend;
