//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Failed to sign URL: {0}")]
    SigningFailed(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object read back from a backend.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// Object store abstraction
///
/// Every backend (S3, local filesystem, memory) implements this trait so the
/// ingestion pipeline and read path never depend on a concrete store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket this backend serves. New objects are written here.
    fn bucket(&self) -> &str;

    /// Store `data` under `(bucket, key)` in a single put.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()>;

    /// Store everything `reader` yields under `(bucket, key)`.
    ///
    /// The reader is drained first and the object is written with one put, so
    /// a failed read never leaves a partial object behind. Returns the number
    /// of bytes stored.
    ///
    /// The whole object is held in memory until the put completes, so peak
    /// usage grows with concurrent uploads times the upload ceiling.
    async fn put_stream(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send>>,
    ) -> StorageResult<u64> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        let size = buffer.len() as u64;
        self.put(bucket, key, content_type, Bytes::from(buffer))
            .await?;
        Ok(size)
    }

    /// Read a whole object.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject>;

    /// Generate a time-limited URL granting read access to `(bucket, key)`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check a token minted by `presign_get` for an object this service serves.
    ///
    /// Backends whose URLs point at the remote store directly have nothing to
    /// verify here and reject every token.
    fn verify_access(&self, bucket: &str, key: &str, _token: &str) -> StorageResult<()> {
        Err(StorageError::AccessDenied(format!(
            "{}/{} is not served by this service",
            bucket, key
        )))
    }

    /// Cheap reachability check used by the health endpoint.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject locators naming a bucket other than the one a backend serves.
pub(crate) fn ensure_bucket(expected: &str, bucket: &str) -> StorageResult<()> {
    if expected == bucket {
        Ok(())
    } else {
        Err(StorageError::UnknownBucket(bucket.to_string()))
    }
}
