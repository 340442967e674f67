pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::document_service::DocumentService;
use crate::services::mailer::Mailer;
use crate::services::storage::BlobStore;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::documents::upload_document,
        api::handlers::documents::list_documents,
        api::handlers::documents::download_document,
        api::handlers::documents::delete_document,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::documents::DocumentResponse,
            api::handlers::documents::DeleteResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "documents", description = "Document upload, listing, download and deletion"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn BlobStore>,
    pub documents: Arc<DocumentService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/documents/upload",
            post(api::handlers::documents::upload_document).layer(
                axum::extract::DefaultBodyLimit::max(
                    state.config.max_file_size + 1024 * 1024, // 1MB buffer for multipart overhead
                ),
            ),
        )
        .route(
            "/api/documents",
            get(api::handlers::documents::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(api::handlers::documents::download_document)
                .delete(api::handlers::documents::delete_document),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Clone)]
pub struct RelayState {
    pub mailer: Arc<Mailer>,
}

pub fn create_relay_app(state: RelayState) -> Router {
    Router::new()
        .route("/send-email", post(api::handlers::contact::send_contact))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
