use crate::api::error::AppError;
use crate::utils::validation::sanitize_filename;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Durable byte storage addressed by an opaque, collision-resistant key.
///
/// Keys are generated on `put` and recorded in the catalog; callers never
/// construct them. Reading is split in two: `get_path` only resolves and
/// checks existence, streaming the bytes is left to the caller.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        data: Bytes,
        media_type: Option<&str>,
        original_name: &str,
    ) -> Result<String, AppError>;
    async fn get_path(&self, storage_key: &str) -> Result<PathBuf, AppError>;
    async fn delete(&self, storage_key: &str) -> Result<(), AppError>;
}

/// Blob store backed by a flat directory on local disk.
pub struct DiskBlobStore {
    root: PathBuf,
    max_size: usize,
}

impl DiskBlobStore {
    pub fn new(root: PathBuf, max_size: usize) -> Self {
        Self { root, max_size }
    }

    /// Build a storage key that is unique in practice even for identical
    /// filenames submitted within the same millisecond: creation timestamp,
    /// a nine-digit random suffix, and the sanitized original name (keeping
    /// the extension).
    fn generate_storage_key(original_name: &str) -> String {
        let timestamp = Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!(
            "{}-{}-{}",
            timestamp,
            suffix,
            sanitize_filename(original_name)
        )
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn put(
        &self,
        data: Bytes,
        media_type: Option<&str>,
        original_name: &str,
    ) -> Result<String, AppError> {
        if media_type != Some(mime::APPLICATION_PDF.as_ref()) {
            return Err(AppError::UnsupportedMediaType(
                "Only PDF files are allowed".to_string(),
            ));
        }

        if data.len() > self.max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the maximum allowed size of {} bytes",
                self.max_size
            )));
        }

        let storage_key = Self::generate_storage_key(original_name);
        let path = self.root.join(&storage_key);

        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!("Failed to write blob {}: {}", path.display(), e);
            AppError::Storage("Failed to store uploaded file".to_string())
        })?;

        tracing::debug!(
            "Stored blob {} ({} bytes)",
            storage_key,
            data.len()
        );

        Ok(storage_key)
    }

    async fn get_path(&self, storage_key: &str) -> Result<PathBuf, AppError> {
        let path = self.root.join(storage_key);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(AppError::NotFound("File not found on server".to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found on server".to_string()))
            }
            Err(e) => {
                tracing::error!("Failed to stat blob {}: {}", path.display(), e);
                Err(AppError::Storage(
                    "Failed to access file storage".to_string(),
                ))
            }
        }
    }

    async fn delete(&self, storage_key: &str) -> Result<(), AppError> {
        let path = self.root.join(storage_key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already absent: catalog cleanup must still be able to proceed.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!("Failed to delete blob {}: {}", path.display(), e);
                Err(AppError::Storage(
                    "Failed to delete file from storage".to_string(),
                ))
            }
        }
    }
}
