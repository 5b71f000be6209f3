use crate::keys::validate_key;
use crate::signing::UrlSigner;
use crate::traits::{ensure_bucket, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};
use std::sync::Arc;
use std::time::Duration;

/// In-process object store.
///
/// Objects live for the lifetime of the process. Intended for development and
/// tests; URLs are signed like the local backend and served by the API.
#[derive(Clone)]
pub struct MemoryStorage {
    store: Arc<InMemory>,
    bucket: String,
    signer: UrlSigner,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>, signer: UrlSigner) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: bucket.into(),
            signer,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;

        let size = data.len() as u64;
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&Path::from(key), PutPayload::from(data), opts)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            "Memory storage upload successful"
        );

        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;

        let result = self
            .store
            .get(&Path::from(key))
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
                other => StorageError::DownloadFailed(other.to_string()),
            })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(StoredObject { data, content_type })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;
        self.signer.sign(bucket, key, expires_in)
    }

    fn verify_access(&self, bucket: &str, key: &str, token: &str) -> StorageResult<()> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;
        self.signer.verify(bucket, key, token)
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
