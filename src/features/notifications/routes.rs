use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationDispatcher;

/// Admin mail routes (require JWT authentication)
pub fn routes(dispatcher: Arc<NotificationDispatcher>) -> Router {
    Router::new()
        .route("/api/admin/mail/test", post(handlers::send_test_email))
        .with_state(dispatcher)
}
