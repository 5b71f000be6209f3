//! Object store wrapper that remembers what was written.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tubely_storage::{MemoryStorage, Storage, StorageBackend, StorageResult, StoredObject};

#[derive(Clone)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    puts: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            puts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(bucket, key)` of every successful put, in order.
    pub fn puts(&self) -> Vec<(String, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        self.inner.put(bucket, key, content_type, data).await?;
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        self.inner.get(bucket, key).await
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.presign_get(bucket, key, expires_in).await
    }

    fn verify_access(&self, bucket: &str, key: &str, token: &str) -> StorageResult<()> {
        self.inner.verify_access(bucket, key, token)
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
