use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::audit::dtos::{
    AuditEntryResponseDto, AuditLogQuery, AuditStatsResponseDto, CleanupLogsDto,
    CleanupLogsResponseDto,
};
use crate::features::audit::services::AuditLog;
use crate::features::auth::RequestContext;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/admin/logs",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Activity log page", body = ApiResponse<Vec<AuditEntryResponseDto>>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "audit",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_logs(
    State(audit): State<Arc<AuditLog>>,
    ctx: RequestContext,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<ApiResponse<Vec<AuditEntryResponseDto>>>> {
    let filter = query.to_filter()?;
    let page = audit.query(&ctx, &filter, query.page()).await?;
    let meta = Meta::paged(page.total, page.page, page.page_size, page.total_pages());
    let entries = page.entries.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(Some(entries), None, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/admin/logs/stats",
    responses(
        (status = 200, description = "Activity log statistics", body = ApiResponse<AuditStatsResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "audit",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_log_stats(
    State(audit): State<Arc<AuditLog>>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<AuditStatsResponseDto>>> {
    let stats = audit.stats(&ctx).await?;
    let actions = audit.actions(&ctx).await?;

    Ok(Json(ApiResponse::success(
        Some(AuditStatsResponseDto::new(stats, actions)),
        None,
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/logs/cleanup",
    request_body = CleanupLogsDto,
    responses(
        (status = 200, description = "Old entries deleted", body = ApiResponse<CleanupLogsResponseDto>),
        (status = 400, description = "Days to keep out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required")
    ),
    tag = "audit",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cleanup_logs(
    State(audit): State<Arc<AuditLog>>,
    ctx: RequestContext,
    AppJson(dto): AppJson<CleanupLogsDto>,
) -> Result<Json<ApiResponse<CleanupLogsResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let deleted = audit.purge(&ctx, dto.days_to_keep).await?;

    Ok(Json(ApiResponse::success(
        Some(CleanupLogsResponseDto { deleted }),
        Some(format!("Deleted {} old log entries", deleted)),
        None,
    )))
}
