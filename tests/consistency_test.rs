//! The catalog and the blob directory are independent stores; these tests
//! cover the divergence cases: a row whose blob has gone missing must read
//! as "not found" without being reconciled, and deleting such a row must
//! still succeed.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use document_portal::config::AppConfig;
use document_portal::entities::prelude::*;
use document_portal::infrastructure::database;
use document_portal::services::document_service::DocumentService;
use document_portal::services::storage::{BlobStore, DiskBlobStore};
use document_portal::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::{Database, EntityTrait};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn setup_app() -> (axum::Router, AppState, tempfile::TempDir) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn BlobStore> = Arc::new(DiskBlobStore::new(
        dir.path().to_path_buf(),
        10 * 1024 * 1024,
    ));
    let documents = Arc::new(DocumentService::new(db.clone(), storage.clone()));

    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        upload_dir: dir.path().to_path_buf(),
        max_file_size: 10 * 1024 * 1024,
        port: 0,
    };

    let state = AppState {
        db,
        storage,
        documents,
        config,
    };

    (create_app(state.clone()), state, dir)
}

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

async fn upload(app: &axum::Router, filename: &str) -> i64 {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.4 content\r\n\
         --{BOUNDARY}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/documents/upload")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["id"].as_i64().unwrap()
}

/// Remove the blob behind a document, simulating the divergence window.
async fn remove_blob(state: &AppState, dir: &tempfile::TempDir, id: i64) {
    let row = Documents::find_by_id(id as i32)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    tokio::fs::remove_file(dir.path().join(&row.filepath))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_download_with_missing_blob_returns_not_found() {
    let (app, state, dir) = setup_app().await;

    let id = upload(&app, "vanished.pdf").await;
    remove_blob(&state, &dir, id).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/documents/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "File not found on server");

    // The divergence is surfaced, not silently reconciled: the row remains.
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/documents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let docs: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(docs.len(), 1);
}

#[tokio::test]
async fn test_delete_with_missing_blob_still_removes_row() {
    let (app, state, dir) = setup_app().await;

    let id = upload(&app, "orphan-row.pdf").await;
    remove_blob(&state, &dir, id).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/documents/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let rows = Documents::find().all(&state.db).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_delete_leaves_other_documents_untouched() {
    let (app, state, dir) = setup_app().await;

    let keep = upload(&app, "keep.pdf").await;
    let remove = upload(&app, "remove.pdf").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/documents/{remove}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rows = Documents::find().all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id as i64, keep);
    assert!(dir.path().join(&rows[0].filepath).exists());
}
