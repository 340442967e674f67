use crate::api::error::AppError;
use crate::entities::documents;
use crate::services::catalog::DocumentCatalog;
use crate::services::storage::BlobStore;
use bytes::Bytes;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

/// Orchestrates the document lifecycle across the blob store and the
/// catalog. The two stores are independent; the ordering of operations
/// below is what keeps them consistent:
///
/// - upload writes the blob before inserting the row, so a row never
///   references bytes that were not fully received;
/// - delete removes the blob (or confirms it absent) before removing the
///   row, so the only divergence a crash can leave is a row pointing at a
///   missing blob, which reads as "not found" and heals on the next delete.
///
/// An insert failure after a successful blob write leaves an orphaned blob.
/// That window is accepted; no compensation or garbage collection runs.
pub struct DocumentService {
    catalog: DocumentCatalog,
    storage: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            catalog: DocumentCatalog::new(db),
            storage,
        }
    }

    pub async fn upload(
        &self,
        original_name: &str,
        media_type: Option<&str>,
        data: Bytes,
    ) -> Result<documents::Model, AppError> {
        let size_bytes = data.len() as i64;

        let storage_key = self.storage.put(data, media_type, original_name).await?;

        let doc = self
            .catalog
            .insert(original_name, &storage_key, size_bytes)
            .await?;

        tracing::info!(
            "Uploaded document id={} filename={:?} ({} bytes)",
            doc.id,
            doc.filename,
            doc.filesize
        );

        Ok(doc)
    }

    pub async fn list(&self) -> Result<Vec<documents::Model>, AppError> {
        self.catalog.list_all().await
    }

    /// Resolve a document to its display metadata and on-disk path. The
    /// caller opens the file itself: a delete racing this lookup then
    /// surfaces as a clean open failure, never a partial read.
    pub async fn open_for_download(
        &self,
        id: i32,
    ) -> Result<(documents::Model, PathBuf), AppError> {
        let doc = self.catalog.get_by_id(id).await?;

        // Row present but blob missing is a detectable divergence; it is
        // reported to the caller rather than reconciled here.
        let path = self.storage.get_path(&doc.filepath).await?;

        Ok((doc, path))
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let doc = self.catalog.get_by_id(id).await?;

        // Storage first: if the blob cannot be confirmed gone, keep the row
        // so the next attempt can retry. An already-absent blob is fine.
        self.storage.delete(&doc.filepath).await?;

        self.catalog.delete_by_id(id).await?;

        tracing::info!("Deleted document id={} filename={:?}", id, doc.filename);

        Ok(())
    }
}
