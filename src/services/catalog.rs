use crate::api::error::AppError;
use crate::entities::{documents, prelude::*};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

/// Metadata persistence for uploaded documents. Rows are appended on upload
/// and removed on delete, never updated in place.
#[derive(Clone)]
pub struct DocumentCatalog {
    db: DatabaseConnection,
}

impl DocumentCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        display_name: &str,
        storage_key: &str,
        size_bytes: i64,
    ) -> Result<documents::Model, AppError> {
        let row = documents::ActiveModel {
            filename: Set(display_name.to_string()),
            filepath: Set(storage_key.to_string()),
            filesize: Set(size_bytes),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = row.insert(&self.db).await?;
        Ok(model)
    }

    /// Full table, newest first. Same-timestamp rows fall back to id order
    /// so insertion order is preserved.
    pub async fn list_all(&self) -> Result<Vec<documents::Model>, AppError> {
        let rows = Documents::find()
            .order_by_desc(documents::Column::CreatedAt)
            .order_by_desc(documents::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<documents::Model, AppError> {
        Documents::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    pub async fn delete_by_id(&self, id: i32) -> Result<(), AppError> {
        let res = Documents::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }
}
