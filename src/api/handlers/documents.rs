use crate::api::error::AppError;
use crate::entities::documents;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

/// Document metadata as exposed over the API. The internal storage key is
/// deliberately absent.
#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: i32,
    pub filename: String,
    pub filesize: i64,
    pub created_at: DateTime<Utc>,
}

impl From<documents::Model> for DocumentResponse {
    fn from(doc: documents::Model) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename,
            filesize: doc.filesize,
            created_at: doc.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/documents/upload",
    request_body(content = Multipart, description = "PDF file upload, field name `file`"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "No file, wrong media type, or oversize payload"),
        (status = 500, description = "Storage or catalog fault")
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let mut uploaded: Option<documents::Model> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let original_filename = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field.bytes().await.map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("length limit exceeded") {
                AppError::PayloadTooLarge(
                    "Request body exceeds the maximum allowed limit".to_string(),
                )
            } else {
                AppError::BadRequest(err_msg)
            }
        })?;

        uploaded = Some(
            state
                .documents
                .upload(&original_filename, content_type.as_deref(), data)
                .await?,
        );
    }

    let doc = uploaded.ok_or_else(|| {
        AppError::BadRequest("No file uploaded or invalid file type (PDF only)".to_string())
    })?;

    Ok((StatusCode::CREATED, Json(doc.into())))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "All documents, newest first", body = Vec<DocumentResponse>),
        (status = 500, description = "Catalog fault")
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let docs = state.documents.list().await?;
    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(
        ("id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "File download stream"),
        (status = 404, description = "Unknown id, or file missing on server"),
        (status = 500, description = "Catalog fault")
    ),
    tag = "documents"
)]
pub async fn download_document(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let (doc, path) = state.documents.open_for_download(id).await?;

    // Open here, not in the service: a concurrent delete between the
    // existence check and this open degrades to a plain 404.
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found on server".to_string()));
        }
        Err(e) => {
            tracing::error!("Failed to open blob {}: {}", path.display(), e);
            return Err(AppError::Storage("Failed to read file".to_string()));
        }
    };

    let stream = ReaderStream::new(file);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&doc.filename),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(
        ("id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document deleted", body = DeleteResponse),
        (status = 404, description = "Unknown id"),
        (status = 500, description = "Storage or catalog fault")
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.documents.delete(id).await?;

    Ok(Json(DeleteResponse {
        message: "Document deleted successfully".to_string(),
    }))
}

/// Offer the display name on download, with an ASCII fallback plus an
/// RFC 5987 encoded form for non-ASCII names.
fn attachment_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_uses_display_name() {
        let header = attachment_disposition("summary.pdf");
        assert!(header.starts_with("attachment; filename=\"summary.pdf\""));
    }

    #[test]
    fn test_disposition_non_ascii_fallback() {
        let header = attachment_disposition("überweisung.pdf");
        assert!(header.contains("filename=\"berweisung.pdf\""));
        assert!(header.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_disposition_empty_ascii_falls_back_to_file() {
        let header = attachment_disposition("報告書");
        assert!(header.contains("filename=\"file\""));
    }
}
