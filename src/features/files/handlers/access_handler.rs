use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::RequestContext;
use crate::features::files::dtos::{GrantOutcomeDto, RevokeOutcomeDto, UserSelectionDto};
use crate::features::files::services::AccessController;
use crate::shared::types::ApiResponse;

#[utoipa::path(
    post,
    path = "/api/admin/files/{id}/access/grant",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = UserSelectionDto,
    responses(
        (status = 200, description = "Access granted", body = ApiResponse<GrantOutcomeDto>),
        (status = 400, description = "No users selected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required, or inactive user"),
        (status = 404, description = "File not found")
    ),
    tag = "access",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn grant_access(
    State(access): State<Arc<AccessController>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UserSelectionDto>,
) -> Result<Json<ApiResponse<GrantOutcomeDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = access.grant_many(&ctx, id, &dto.user_ids).await?;
    let message = outcome.message.clone();

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/files/{id}/access/revoke",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = UserSelectionDto,
    responses(
        (status = 200, description = "Access revoked", body = ApiResponse<RevokeOutcomeDto>),
        (status = 400, description = "No users selected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "File not found")
    ),
    tag = "access",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revoke_access(
    State(access): State<Arc<AccessController>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UserSelectionDto>,
) -> Result<Json<ApiResponse<RevokeOutcomeDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = access.revoke_many(&ctx, id, &dto.user_ids).await?;
    let message = outcome.message.clone();

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/files/{id}/access/grant-all",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Access granted to all active users", body = ApiResponse<GrantOutcomeDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "File not found")
    ),
    tag = "access",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn grant_access_all(
    State(access): State<Arc<AccessController>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GrantOutcomeDto>>> {
    let outcome = access.grant_all(&ctx, id).await?;
    let message = outcome.message.clone();

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/files/{id}/access/revoke-all",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "All access revoked", body = ApiResponse<RevokeOutcomeDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access and CSRF token required"),
        (status = 404, description = "File not found")
    ),
    tag = "access",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn revoke_access_all(
    State(access): State<Arc<AccessController>>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RevokeOutcomeDto>>> {
    let outcome = access.revoke_all_for_file(&ctx, id).await?;
    let message = outcome.message.clone();

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}
