use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::audit::handlers;
use crate::features::audit::services::AuditLog;

/// Admin activity log routes (require JWT authentication)
pub fn routes(audit: Arc<AuditLog>) -> Router {
    Router::new()
        .route("/api/admin/logs", get(handlers::list_logs))
        .route("/api/admin/logs/stats", get(handlers::get_log_stats))
        .route("/api/admin/logs/cleanup", post(handlers::cleanup_logs))
        .with_state(audit)
}
