use crate::keys::validate_key;
use crate::signing::UrlSigner;
use crate::traits::{ensure_bucket, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}`. Writes go to a sibling
/// partial file first and are renamed into place, so readers never observe a
/// half-written object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    bucket: String,
    signer: UrlSigner,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/tubely/media")
    /// * `bucket` - Bucket name this instance serves
    /// * `signer` - Signs URLs pointing at the API's `/media` route
    pub async fn new(
        base_path: impl Into<PathBuf>,
        bucket: impl Into<String>,
        signer: UrlSigner,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let bucket = bucket.into();

        fs::create_dir_all(base_path.join(&bucket))
            .await
            .map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;

        Ok(LocalStorage {
            base_path,
            bucket,
            signer,
        })
    }

    /// Convert a locator to a filesystem path, refusing anything that would
    /// resolve outside the bucket directory.
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;

        let bucket_dir = self.base_path.join(&self.bucket);
        let path = bucket_dir.join(key);
        if !path.starts_with(&bucket_dir) {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }
        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn content_type_for(key: &str) -> Option<String> {
    let extension = Path::new(key).extension()?.to_str()?.to_lowercase();
    let content_type = match extension.as_str() {
        "mp4" => "video/mp4",
        "json" => "application/json",
        _ => "application/octet-stream",
    };
    Some(content_type.to_string())
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let partial = path.with_extension(format!("partial-{}", std::process::id()));

        let write = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&partial, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&partial).await;
            tracing::error!(
                error = %e,
                path = %path.display(),
                key = %key,
                size_bytes = size,
                "Local storage upload failed"
            );
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let path = self.object_path(bucket, key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(StoredObject {
            data: Bytes::from(data),
            content_type: content_type_for(key),
        })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.object_path(bucket, key)?;
        self.signer.sign(bucket, key, expires_in)
    }

    fn verify_access(&self, bucket: &str, key: &str, token: &str) -> StorageResult<()> {
        self.object_path(bucket, key)?;
        self.signer.verify(bucket, key, token)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let dir = self.base_path.join(&self.bucket);
        let meta = fs::metadata(&dir)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StorageError::BackendError(format!(
                "{} is not a directory",
                dir.display()
            )))
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
