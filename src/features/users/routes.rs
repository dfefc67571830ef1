use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserDirectory;

/// Admin user management routes (require JWT authentication)
pub fn routes(directory: Arc<UserDirectory>) -> Router {
    Router::new()
        .route(
            "/api/admin/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/admin/users/active", get(handlers::list_active_users))
        .route(
            "/api/admin/users/{id}/status",
            patch(handlers::update_user_status),
        )
        .route(
            "/api/admin/users/{id}/password",
            put(handlers::reset_password),
        )
        .with_state(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::CSRF_HEADER;
    use crate::features::audit::AuditLog;
    use crate::features::auth::{CsrfTokenStore, HmacCsrfTokenStore, RequestGuard};
    use crate::shared::test_helpers::{
        create_admin_user, test_csrf_store, test_hasher, with_admin_auth, MemoryStore,
        PlainHasher, TEST_CSRF_SECRET,
    };
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    fn server(store: Arc<MemoryStore>) -> TestServer {
        let guard = Arc::new(RequestGuard::new(test_csrf_store()));
        let audit = Arc::new(AuditLog::new(store.clone(), guard.clone()));
        let directory = Arc::new(UserDirectory::new(store, guard, audit, test_hasher()));
        TestServer::new(with_admin_auth(routes(directory))).unwrap()
    }

    fn csrf_header() -> (HeaderName, HeaderValue) {
        let token = HmacCsrfTokenStore::new(TEST_CSRF_SECRET)
            .issue_token(&create_admin_user().session_id);
        (
            HeaderName::from_static(CSRF_HEADER),
            HeaderValue::from_str(&token).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_then_reset_password() {
        let store = Arc::new(MemoryStore::new());
        let server = server(store.clone());
        let (name, value) = csrf_header();

        let response = server
            .post("/api/admin/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "username": "jdoe",
                "email": "jdoe@example.com",
                "full_name": "Jane Doe",
                "password": "secret1"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["data"]["role"], "user");
        assert!(body["data"].get("password_hash").is_none());

        let user = store.find_by_username("jdoe").unwrap();
        let response = server
            .put(&format!("/api/admin/users/{}/password", user.id))
            .add_header(name, value)
            .json(&json!({ "new_password": "changed-1" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            store.password_hash(user.id),
            Some(PlainHasher::digest("changed-1"))
        );
    }

    #[tokio::test]
    async fn test_create_without_csrf_is_forbidden() {
        let store = Arc::new(MemoryStore::new());
        let response = server(store.clone())
            .post("/api/admin/users")
            .json(&json!({
                "username": "jdoe",
                "email": "jdoe@example.com",
                "full_name": "Jane Doe",
                "password": "secret1"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(store.find_by_username("jdoe").is_none());
    }
}
