use crate::config::AppConfig;
use crate::services::storage::DiskBlobStore;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<DiskBlobStore>> {
    fs::create_dir_all(&config.upload_dir).await?;

    info!(
        "🗄️  Blob store: {} (max upload {} MiB)",
        config.upload_dir.display(),
        config.max_file_size / 1024 / 1024
    );

    Ok(Arc::new(DiskBlobStore::new(
        config.upload_dir.clone(),
        config.max_file_size,
    )))
}
