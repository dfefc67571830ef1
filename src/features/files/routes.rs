use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::{AccessController, FileService, UploadTransaction};

/// Reader routes (require JWT authentication)
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/files", get(handlers::list_files))
        .route("/api/files/{id}", get(handlers::get_file))
        .route("/api/files/{id}/download", get(handlers::download_file))
        .route("/api/admin/files", get(handlers::admin_list_files))
        .route("/api/admin/files/{id}", delete(handlers::delete_file))
        .route("/api/admin/files/{id}/access", get(handlers::list_file_access))
        .with_state(file_service)
}

/// Batch upload route; `body_limit` covers every file of the batch plus multipart overhead
pub fn upload_routes(uploads: Arc<UploadTransaction>, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/api/admin/files/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(uploads)
}

/// Grant and revoke routes
pub fn access_routes(access: Arc<AccessController>) -> Router {
    Router::new()
        .route(
            "/api/admin/files/{id}/access/grant",
            post(handlers::grant_access),
        )
        .route(
            "/api/admin/files/{id}/access/revoke",
            post(handlers::revoke_access),
        )
        .route(
            "/api/admin/files/{id}/access/grant-all",
            post(handlers::grant_access_all),
        )
        .route(
            "/api/admin/files/{id}/access/revoke-all",
            post(handlers::revoke_access_all),
        )
        .with_state(access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UploadConfig;
    use crate::features::audit::AuditLog;
    use crate::features::auth::{CsrfTokenStore, HmacCsrfTokenStore, RequestGuard};
    use crate::features::notifications::NotificationDispatcher;
    use crate::shared::test_helpers::{
        create_admin_user, test_csrf_store, with_admin_auth, MemoryBlobStorage, MemoryStore,
        RecordingMailTransport, TEST_CSRF_SECRET,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    fn server() -> TestServer {
        server_with(Arc::new(MemoryStore::new()), Arc::new(MemoryBlobStorage::new()))
    }

    fn server_with(store: Arc<MemoryStore>, blobs: Arc<MemoryBlobStorage>) -> TestServer {
        let guard = Arc::new(RequestGuard::new(test_csrf_store()));
        let audit = Arc::new(AuditLog::new(store.clone(), guard.clone()));
        let notifier = Arc::new(NotificationDispatcher::new(
            Arc::new(RecordingMailTransport::new()),
            audit.clone(),
            guard.clone(),
            "Payroll Portal",
            "http://localhost:3000/",
        ));
        let access = Arc::new(AccessController::new(
            store.clone(),
            guard.clone(),
            audit.clone(),
            notifier.clone(),
        ));
        let uploads = Arc::new(UploadTransaction::new(
            store.clone(),
            blobs.clone(),
            access.clone(),
            audit.clone(),
            notifier.clone(),
            guard.clone(),
            UploadConfig::default(),
        ));
        let files = Arc::new(FileService::new(store, blobs, access.clone(), audit, guard));

        let app = with_admin_auth(
            Router::new()
                .merge(routes(files))
                .merge(upload_routes(uploads, 1024 * 1024))
                .merge(access_routes(access)),
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_listings_are_served() {
        let server = server();
        assert_eq!(server.get("/api/admin/files").await.status_code(), StatusCode::OK);
        assert_eq!(server.get("/api/files").await.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_file_is_not_found() {
        let response = server()
            .get(&format!("/api/files/{}/download", Uuid::now_v7()))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mutation_without_csrf_header_is_forbidden() {
        let response = server()
            .post(&format!("/api/admin/files/{}/access/grant-all", Uuid::now_v7()))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let response = server()
            .post(&format!("/api/admin/files/{}/access/grant", Uuid::now_v7()))
            .json(&json!({ "user_ids": [] }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    fn upload_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("title", "March Payroll")
            .add_text("pay_period", "2024-03")
            .add_part(
                "files[]",
                Part::bytes(b"%PDF-1.4".to_vec())
                    .file_name("march.pdf")
                    .mime_type("application/pdf"),
            )
    }

    #[tokio::test]
    async fn test_upload_accepts_csrf_form_field() {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let server = server_with(store.clone(), blobs.clone());
        let token = HmacCsrfTokenStore::new(TEST_CSRF_SECRET)
            .issue_token(&create_admin_user().session_id);

        let response = server
            .post("/api/admin/files/upload")
            .multipart(upload_form().add_text("csrf_token", token))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(store.files().len(), 1);
        assert_eq!(blobs.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_csrf_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let server = server_with(store.clone(), blobs.clone());

        let response = server
            .post("/api/admin/files/upload")
            .multipart(upload_form())
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(store.files().is_empty());
        assert!(blobs.is_empty());
    }
}
